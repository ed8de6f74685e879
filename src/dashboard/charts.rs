//! Chart generation and rendering for the dashboard.
//!
//! This module creates ECharts visualizations for financial data:
//! - **Expense Chart**: total expenses per category as a pie chart
//! - **Balance Chart**: net monthly balance over the trailing six months
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization
//! code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    datatype::DataPointItem,
    element::{AxisLabel, AxisType, ItemStyle, JsFunction, Tooltip, Trigger},
    series::{Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    dashboard::aggregation::{CategorySlice, MonthBalance},
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Total expenses per category as a pie chart, slices colored from the fixed
/// palette in group insertion order.
pub(super) fn expense_chart(slices: &[CategorySlice]) -> Chart {
    let data: Vec<DataPointItem> = slices
        .iter()
        .map(|slice| {
            DataPointItem::new(slice.value)
                .name(slice.name.clone())
                .item_style(ItemStyle::new().color(slice.color))
        })
        .collect();

    let pie = Pie::new().name("Pengeluaran").radius("70%").data(data);

    Chart::new()
        .title(
            Title::new()
                .text("Pengeluaran per Kategori")
                .subtext("Semua waktu"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item).value_formatter(rupiah_formatter()))
        .legend(Legend::new().bottom("0%"))
        .series(pie)
}

/// Net monthly balance over the trailing months as a line chart.
pub(super) fn balance_chart(series: &[MonthBalance]) -> Chart {
    let labels: Vec<String> = series.iter().map(|entry| entry.label.clone()).collect();
    let values: Vec<f64> = series.iter().map(|entry| entry.balance).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Saldo Bulanan")
                .subtext("Enam bulan terakhir"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Axis).value_formatter(rupiah_formatter()))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(rupiah_formatter())),
        )
        .series(Line::new().name("Saldo").data(values))
}

#[inline]
fn rupiah_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const rupiahFormatter = new Intl.NumberFormat('id-ID', {
              style: 'currency',
              currency: 'IDR',
              maximumFractionDigits: 0
            });
            return (number || number === 0) ? rupiahFormatter.format(number) : \"-\";",
    )
}
