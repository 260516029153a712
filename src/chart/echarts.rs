//! Interactive ECharts charts for the report page.
//!
//! Each chart is serialized to a JSON options object with `charming` and
//! initialized by a small script in the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Bar, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    aggregation::{CategoryTotals, MonthlySummary},
    html::HeadElement,
};

/// An ECharts chart with the ID of the element it is drawn in.
pub struct EChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The containers the charts are drawn into.
pub fn echarts_view(charts: &[EChart]) -> Markup {
    html!(
        div class="grid grid-cols-1 xl:grid-cols-2 gap-4 w-full"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded bg-white dark:bg-gray-100"
                {}
            }
        }
    )
}

/// The script that initializes every chart once the page has loaded.
pub fn echarts_script(charts: &[EChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    chart.setOption({});
                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    )))
}

fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// A pie chart of the expense category totals.
pub fn category_pie_chart(totals: &CategoryTotals) -> Chart {
    let data: Vec<(f64, &str)> = totals
        .iter()
        .map(|(category, total)| (*total, category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by Category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("8%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["35%", "65%"])
                .data(data),
        )
}

/// A bar chart comparing income and expenses for each month.
pub fn monthly_bar_chart(months: &[MonthlySummary]) -> Chart {
    let labels: Vec<String> = months.iter().map(month_label).collect();
    let income: Vec<f64> = months.iter().map(|summary| summary.income).collect();
    let expenses: Vec<f64> = months.iter().map(|summary| summary.expense).collect();

    Chart::new()
        .title(Title::new().text("Monthly Income and Expenses"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().top("8%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Income").data(income))
        .series(Bar::new().name("Expenses").data(expenses))
}

/// A short label for a month, e.g. "Oct 2025".
pub fn month_label(summary: &MonthlySummary) -> String {
    let month = match summary.month.month() {
        time::Month::January => "Jan",
        time::Month::February => "Feb",
        time::Month::March => "Mar",
        time::Month::April => "Apr",
        time::Month::May => "May",
        time::Month::June => "Jun",
        time::Month::July => "Jul",
        time::Month::August => "Aug",
        time::Month::September => "Sep",
        time::Month::October => "Oct",
        time::Month::November => "Nov",
        time::Month::December => "Dec",
    };

    format!("{month} {}", summary.month.year())
}
