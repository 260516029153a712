//! The charts page and the endpoints that serve the chart images.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{CategoryTotals, category_totals},
    auth::UserID,
    chart::{
        data::{ChartData, ChartKind, palette_hex},
        png::{CHART_HEIGHT, CHART_WIDTH, render_png},
    },
    endpoints,
    expense::get_user_expenses,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base, format_currency, link},
    navigation::NavBar,
};

/// The state needed to draw the charts.
#[derive(Debug, Clone)]
pub struct ChartState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ChartState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn load_category_totals(state: &ChartState, user_id: UserID) -> Result<CategoryTotals, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_user_expenses(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get expenses for {user_id}: {error}"))?;

    Ok(category_totals(&expenses))
}

fn legend_view(totals: &CategoryTotals) -> Markup {
    html!(
        ul id="chart-legend" class={ "w-full space-y-2 " (CARD_STYLE) }
        {
            @for (i, (category, total)) in totals.iter().enumerate() {
                li class="flex items-center justify-between gap-4"
                {
                    span class="flex items-center gap-2"
                    {
                        span
                            class="inline-block w-4 h-4 rounded-sm"
                            style={ "background-color: " (palette_hex(i)) ";" }
                        {}
                        span { (category) }
                    }

                    span class="font-medium" { (format_currency(*total)) }
                }
            }
        }
    )
}

fn chart_image(url: &str, alt: &str) -> Markup {
    html!(
        figure class=(CARD_STYLE)
        {
            img
                src=(url)
                alt=(alt)
                width=(CHART_WIDTH)
                height=(CHART_HEIGHT)
                class="w-full h-auto";
            figcaption class="mt-2 text-sm text-center text-gray-500 dark:text-gray-400"
            {
                (alt)
            }
        }
    )
}

fn charts_view(totals: &CategoryTotals) -> Markup {
    let content = html!(
        (NavBar::new(endpoints::CHARTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Expense Charts" }

                @if totals.is_empty() {
                    p id="no-chart-data" class="text-gray-500 dark:text-gray-400"
                    {
                        "There are no expenses to chart yet. Add some on the "
                        (link(endpoints::DASHBOARD_VIEW, "dashboard"))
                        " and they will show up here."
                    }
                } @else {
                    div id="charts" class="grid grid-cols-1 lg:grid-cols-3 gap-4"
                    {
                        (chart_image(endpoints::EXPENSE_PIE_CHART, "Expenses by category (pie)"))
                        (chart_image(endpoints::EXPENSE_BAR_CHART, "Expenses by category (bar)"))
                        (chart_image(endpoints::EXPENSE_LINE_CHART, "Expenses by category (line)"))
                    }

                    (legend_view(totals))
                }
            }
        }
    );

    base("Charts", &[], &content)
}

/// Display the three expense chart images with a legend.
pub async fn get_charts_page(
    State(state): State<ChartState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match load_category_totals(&state, user_id) {
        Ok(totals) => charts_view(&totals).into_response(),
        Err(error) => error.into_response(),
    }
}

fn chart_png_response(state: &ChartState, user_id: UserID, kind: ChartKind) -> Response {
    let png = load_category_totals(state, user_id)
        .map(|totals| ChartData::from_totals(&totals))
        .and_then(|data| render_png(kind, &data));

    match png {
        Ok(png) => ([(CONTENT_TYPE, "image/png")], png).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A pie chart of the user's expenses by category as a PNG image.
pub async fn get_expense_pie_chart(
    State(state): State<ChartState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    chart_png_response(&state, user_id, ChartKind::Pie)
}

/// A bar chart of the user's expenses by category as a PNG image.
pub async fn get_expense_bar_chart(
    State(state): State<ChartState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    chart_png_response(&state, user_id, ChartKind::Bar)
}

/// A line chart of the user's expenses by category as a PNG image.
pub async fn get_expense_line_chart(
    State(state): State<ChartState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    chart_png_response(&state, user_id, ChartKind::Line)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        UserID, endpoints,
        expense::{ExpenseType, NewExpense, create_expense},
        test_utils::{
            assert_content_type, assert_valid_html, create_test_user, get_test_connection,
            parse_html_document,
        },
    };

    use super::{
        ChartState, get_charts_page, get_expense_bar_chart, get_expense_line_chart,
        get_expense_pie_chart,
    };

    fn get_state() -> (ChartState, UserID, UserID) {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let other_user = create_test_user(&connection, "other@example.com");

        (
            ChartState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
            other_user.id,
        )
    }

    fn add_expense(state: &ChartState, user_id: UserID, amount: f64, category: &str) {
        let connection = state.db_connection.lock().unwrap();
        create_expense(
            NewExpense::new(amount, category, ExpenseType::Expense).unwrap(),
            user_id,
            &connection,
        )
        .unwrap();
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn charts_page_without_expenses_shows_placeholder() {
        let (state, user_id, _) = get_state();

        let response = get_charts_page(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert!(
            document
                .select(&Selector::parse("#no-chart-data").unwrap())
                .next()
                .is_some()
        );
        assert_eq!(document.select(&Selector::parse("img").unwrap()).count(), 0);
    }

    #[tokio::test]
    async fn charts_page_embeds_images_and_legend() {
        let (state, user_id, other_user_id) = get_state();
        add_expense(&state, user_id, 40.0, "Food");
        add_expense(&state, user_id, 10.0, "Food");
        add_expense(&state, user_id, 900.0, "Rent");
        add_expense(&state, other_user_id, 5.0, "Hobbies");

        let response = get_charts_page(State(state), Extension(user_id)).await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let sources: Vec<&str> = document
            .select(&Selector::parse("#charts img").unwrap())
            .filter_map(|img| img.value().attr("src"))
            .collect();
        assert_eq!(
            sources,
            vec![
                endpoints::EXPENSE_PIE_CHART,
                endpoints::EXPENSE_BAR_CHART,
                endpoints::EXPENSE_LINE_CHART
            ]
        );

        let legend: Vec<String> = document
            .select(&Selector::parse("#chart-legend li").unwrap())
            .map(|item| item.text().collect::<String>())
            .collect();
        assert_eq!(legend.len(), 2);
        assert!(legend[0].contains("Food") && legend[0].contains("$50.00"));
        assert!(legend[1].contains("Rent") && legend[1].contains("$900.00"));
    }

    #[tokio::test]
    async fn chart_endpoints_return_png_with_and_without_data() {
        let (state, user_id, _) = get_state();

        for with_data in [false, true] {
            if with_data {
                add_expense(&state, user_id, 12.5, "Food");
            }

            let responses = [
                get_expense_pie_chart(State(state.clone()), Extension(user_id)).await,
                get_expense_bar_chart(State(state.clone()), Extension(user_id)).await,
                get_expense_line_chart(State(state.clone()), Extension(user_id)).await,
            ];

            for response in responses {
                assert_eq!(response.status(), StatusCode::OK);
                assert_content_type(&response, "image/png");

                let body = body_bytes(response).await;
                assert!(body.starts_with(b"\x89PNG"));
            }
        }
    }
}
