//! Server-rendered pages.
//!
//! Plain `format!` templates; every interpolated user or artifact string
//! goes through `escape`.

use defect_core::{FeatureOrder, ModelInfo, Prediction, ThresholdConfig, Verdict};

use crate::dataset::Dataset;
use crate::handlers::predict::PredictForm;

/// One numeric input: (form field, feature name, label, step)
pub const NUMERIC_FIELDS: [(&str, &str, &str, f32); 6] = [
    ("temperature", "Temperature", "Temperature (°C)", 1.0),
    ("pressure", "Pressure", "Pressure", 0.1),
    ("humidity", "Humidity", "Humidity (%)", 1.0),
    ("machine_speed", "Machine_Speed", "Machine Speed (RPM)", 10.0),
    ("operator_experience", "Operator_Experience_Years", "Operator Experience (Years)", 1.0),
    ("production_time", "Production_Time", "Production Time (Hours)", 1.0),
];

/// Categorical inputs, shown only when the model declares a vocabulary
pub const CATEGORY_FIELDS: [(&str, &str, &str); 2] = [
    ("shift", "Shift", "Shift"),
    ("material_type", "Material_Type", "Material Type"),
];

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Manufacturing Defect Detection</title>
</head>
<body>
<nav><a href="/">Project Overview</a> | <a href="/data">Data Visualization</a> | <a href="/predict">Defect Prediction</a> | <a href="/high-risk">High Risk Analysis</a></nav>
<main>
{body}
</main>
<footer>Manufacturing Defect Detection Dashboard</footer>
</body>
</html>"#,
        title = escape(title),
        body = body,
    )
}

pub fn overview_page(model: Option<&ModelInfo>, dataset: Option<&Dataset>) -> String {
    let status = match model {
        Some(info) => format!(
            "<p>Loaded model: <strong>{}</strong> ({}, {} features)</p>",
            escape(&info.name),
            escape(&info.kind),
            info.feature_names.len()
        ),
        None => "<p class=\"warning\">No model loaded. Predictions are unavailable.</p>".to_string(),
    };

    let data = match dataset {
        Some(dataset) => format!("<p>Production history: {} runs</p>", dataset.len()),
        None => "<p class=\"warning\">No dataset loaded.</p>".to_string(),
    };

    let body = format!(
        r#"<h1>Manufacturing Defect Detection &amp; Quality Analytics</h1>
<p>Predict the probability that a production run yields a defect from its process parameters.</p>
<h2>Objectives</h2>
<ul>
<li>Predict defect probability</li>
<li>Flag runs above an adjustable risk threshold</li>
<li>Analyze defect-prone conditions</li>
<li>Improve quality control</li>
</ul>
{status}
{data}"#
    );

    layout("Project Overview", &body)
}

/// The form, refilled from `input` after a submit.
///
/// Category options come from the model card's vocabulary, or from the
/// dataset's distinct values when the card declares none.
pub fn predict_page(
    order: &FeatureOrder,
    thresholds: &ThresholdConfig,
    dataset: Option<&Dataset>,
    input: Option<&PredictForm>,
    result: Option<&Prediction>,
) -> String {
    let mut fields = String::new();

    for (field, _, label, step) in NUMERIC_FIELDS {
        let value = input.and_then(|form| form.number(field)).unwrap_or(0.0);
        fields.push_str(&format!(
            "<label>{label} <input type=\"number\" name=\"{field}\" min=\"0\" step=\"{step}\" value=\"{value}\" required></label>\n",
            label = escape(label),
        ));
    }

    for (field, feature, label) in CATEGORY_FIELDS {
        let values = match order.categories(feature) {
            Some(values) => values.to_vec(),
            None => dataset.map(|d| d.distinct(feature)).unwrap_or_default(),
        };
        if values.is_empty() {
            continue;
        }

        let chosen = input.and_then(|form| form.category(field));
        let options: String = values
            .iter()
            .map(|v| {
                let selected = if chosen == Some(v.as_str()) { " selected" } else { "" };
                format!("<option value=\"{0}\"{1}>{0}</option>", escape(v), selected)
            })
            .collect();
        fields.push_str(&format!(
            "<label>{label} <select name=\"{field}\">{options}</select></label>\n",
            label = escape(label),
        ));
    }

    let chosen_threshold = input.map_or(thresholds.default_threshold, |form| form.threshold);
    let threshold_options: String = thresholds
        .steps()
        .iter()
        .map(|t| {
            let selected = if (t - chosen_threshold).abs() < 1e-3 { " selected" } else { "" };
            format!("<option value=\"{t:.2}\"{selected}>{t:.2}</option>")
        })
        .collect();

    let result = result.map(result_card).unwrap_or_default();

    let body = format!(
        r#"<h1>Manufacturing Defect Prediction System</h1>
<p>Predict defect probability using Machine Learning</p>
<form method="post" action="/predict">
{fields}<h3>Defect Decision Sensitivity</h3>
<label>Defect Probability Threshold <select name="threshold">{threshold_options}</select></label>
<button type="submit">Predict Defect</button>
</form>
{result}"#
    );

    layout("Defect Prediction", &body)
}

pub fn result_card(prediction: &Prediction) -> String {
    let alert = match prediction.verdict {
        Verdict::Defect => format!("<div class=\"alert defect\">{}</div>", prediction.verdict.label()),
        Verdict::NoDefect => format!("<div class=\"alert ok\">{}</div>", prediction.verdict.label()),
    };

    let degraded = if prediction.degraded {
        "<div class=\"alert degraded\">Degraded prediction mode: the model only reports a hard label, so the probability is 0% or 100% and the threshold has no effect.</div>\n"
    } else {
        ""
    };

    let bars: String = prediction
        .distribution()
        .iter()
        .map(|(verdict, p)| format!("<li>{}: {:.1}%</li>", verdict, p * 100.0))
        .collect();

    format!(
        r#"<section class="result">
<h2>Defect Probability</h2>
<div class="gauge">{percent}</div>
<p>Threshold: {threshold:.2}</p>
{degraded}{alert}
<h3>Prediction Probability</h3>
<ul class="distribution">{bars}</ul>
</section>"#,
        percent = prediction.probability_percent(),
        threshold = prediction.threshold,
    )
}

fn table<R: AsRef<[String]>>(headers: &[String], rows: &[R]) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .as_ref()
                .iter()
                .map(|c| format!("<td>{}</td>", escape(c)))
                .collect();
            format!("<tr>{}</tr>\n", cells)
        })
        .collect();

    format!("<table>\n<thead><tr>{head}</tr></thead>\n<tbody>\n{body}</tbody>\n</table>")
}

pub fn data_page(dataset: &Dataset, preview_rows: usize) -> String {
    let body = format!(
        "<h1>Manufacturing Data Visualization</h1>\n<h2>Dataset Preview</h2>\n<p>{} rows, {} columns</p>\n{}",
        dataset.len(),
        dataset.headers().len(),
        table(dataset.headers(), dataset.head(preview_rows)),
    );
    layout("Data Visualization", &body)
}

pub fn high_risk_page(headers: &[String], rows: &[&[String]], total: usize) -> String {
    let body = format!(
        "<h1>High Risk Manufacturing Analysis</h1>\n<p>{} of {} runs ended in a defect</p>\n{}",
        rows.len(),
        total,
        table(headers, rows),
    );
    layout("High Risk Analysis", &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p class=\"error\">{}</p>\n<p><a href=\"/predict\">Back to prediction</a></p>",
        escape(title),
        escape(message)
    );
    layout(title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(probability: f32, degraded: bool) -> Prediction {
        Prediction {
            probability,
            threshold: 0.7,
            verdict: defect_core::classify(probability, 0.7),
            degraded,
            inference_time_us: 10,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_result_card_defect() {
        let html = result_card(&prediction(0.82, false));
        assert!(html.contains("82.0%"));
        assert!(html.contains("High Risk of Defect"));
        assert!(html.contains("No Defect: 18.0%"));
        assert!(!html.contains("Degraded"));
    }

    #[test]
    fn test_result_card_degraded() {
        let html = result_card(&prediction(1.0, true));
        assert!(html.contains("100.0%"));
        assert!(html.contains("Degraded prediction mode"));
    }

    #[test]
    fn test_predict_page_lists_vocabulary() {
        let order = FeatureOrder::new(["Temperature", "Shift"])
            .with_categories("Shift", ["Morning", "Night"]);
        let html = predict_page(&order, &ThresholdConfig::default(), None, None, None);

        assert!(html.contains("name=\"shift\""));
        assert!(html.contains("<option value=\"Night\">Night</option>"));
        assert!(!html.contains("name=\"material_type\""));
        assert!(html.contains("<option value=\"0.70\" selected>0.70</option>"));
        assert!(html.contains("<option value=\"0.50\">"));
        assert!(html.contains("<option value=\"0.90\">"));
    }

    fn dataset() -> Dataset {
        Dataset::from_reader(
            "Temperature,Shift,Material_Type,Defect\n80,Night,Steel,1\n60,Morning,<Plastic>,0\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_page_falls_back_to_dataset_values() {
        let order = FeatureOrder::new(["Temperature", "Shift"])
            .with_categories("Shift", ["Evening"]);
        let html = predict_page(&order, &ThresholdConfig::default(), Some(&dataset()), None, None);

        // card vocabulary wins for Shift
        assert!(html.contains("<option value=\"Evening\">Evening</option>"));
        assert!(!html.contains("<option value=\"Night\">"));
        // no card vocabulary for Material_Type, dataset values are listed
        assert!(html.contains("name=\"material_type\""));
        assert!(html.contains("<option value=\"Steel\">Steel</option>"));
        assert!(html.contains("<option value=\"&lt;Plastic&gt;\">"));
    }

    #[test]
    fn test_predict_page_keeps_submitted_values() {
        let order = FeatureOrder::new(["Temperature", "Shift"])
            .with_categories("Shift", ["Morning", "Night"]);
        let form = PredictForm {
            temperature: 82.5,
            pressure: 5.2,
            humidity: 40.0,
            machine_speed: 1200.0,
            operator_experience: 3.0,
            production_time: 8.0,
            shift: Some("Night".to_string()),
            material_type: None,
            threshold: 0.85,
        };
        let html = predict_page(&order, &ThresholdConfig::default(), None, Some(&form), None);

        assert!(html.contains("name=\"temperature\" min=\"0\" step=\"1\" value=\"82.5\""));
        assert!(html.contains("name=\"machine_speed\" min=\"0\" step=\"10\" value=\"1200\""));
        assert!(html.contains("<option value=\"Night\" selected>Night</option>"));
        assert!(html.contains("<option value=\"Morning\">Morning</option>"));
        assert!(html.contains("<option value=\"0.85\" selected>0.85</option>"));
        assert!(!html.contains("<option value=\"0.70\" selected>"));
    }

    #[test]
    fn test_data_page_previews_head() {
        let html = data_page(&dataset(), 1);
        assert!(html.contains("Dataset Preview"));
        assert!(html.contains("2 rows, 4 columns"));
        assert!(html.contains("<th>Material_Type</th>"));
        assert!(html.contains("<td>Night</td>"));
        assert!(!html.contains("<td>Morning</td>"));
    }

    #[test]
    fn test_high_risk_page_escapes_cells() {
        let dataset = dataset();
        let rows: Vec<&[String]> = dataset.head(2).iter().map(Vec::as_slice).collect();
        let html = high_risk_page(dataset.headers(), &rows, 2);

        assert!(html.contains("2 of 2 runs ended in a defect"));
        assert!(html.contains("<td>&lt;Plastic&gt;</td>"));
    }
}
