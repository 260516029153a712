//! Expense charts: the data they plot, PNG rendering and the interactive
//! ECharts charts on the report page.

mod data;
mod echarts;
mod handlers;
mod png;

pub use echarts::{
    EChart, category_pie_chart, echarts_script, echarts_view, month_label, monthly_bar_chart,
};
pub use handlers::{
    get_charts_page, get_expense_bar_chart, get_expense_line_chart, get_expense_pie_chart,
};
