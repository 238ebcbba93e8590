//! UI Routes - HTML form for crop health assessment
//!
//! Single page: leaf upload, soil/environment inputs, results panel.
//! Vanilla HTML/CSS/JS, no frameworks.

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tmt_common::soil::{SoilField, FIELDS};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

fn number_input(field: &SoilField) -> String {
    let step = if field.integer { "1" } else { "0.1" };
    format!(
        r#"        <label for="{name}">{label}</label>
        <input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{default}" required>
"#,
        name = field.name,
        label = field.label,
        min = field.min,
        max = field.max,
        step = step,
        default = field.default,
    )
}

/// Render the assessment page
pub fn render_page() -> String {
    let inputs: String = FIELDS.iter().map(number_input).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Smart Crop Health System</title>
    <style>
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 720px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
        }}
        h1 {{
            color: #333;
            border-bottom: 2px solid #c0392b;
            padding-bottom: 10px;
        }}
        label {{
            display: block;
            margin-top: 10px;
            font-weight: 600;
        }}
        input[type=number] {{
            width: 100%;
            padding: 6px;
        }}
        button {{
            margin-top: 20px;
            padding: 10px 20px;
            background: #c0392b;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }}
        .warning {{
            background: #fff3cd;
            border: 1px solid #ffe08a;
            padding: 10px;
            margin-top: 15px;
        }}
        .hidden {{
            display: none;
        }}
        #preview {{
            max-width: 100%;
            margin-top: 10px;
        }}
        .status-Healthy {{ color: #1e8449; }}
        .status-At-Risk {{ color: #b9770e; }}
        .status-Critical {{ color: #c0392b; }}
    </style>
</head>
<body>
    <h1>TomatoMato — Tomato Crop Health Assessment System 🍅</h1>
    <p>Upload a tomato leaf image and enter soil/environment details.</p>

    <form id="analyze-form">
        <label for="image">Upload leaf image</label>
        <input type="file" id="image" name="image" accept=".jpg,.jpeg,.png,image/jpeg,image/png">

        <h2>Soil &amp; Environment Parameters</h2>
{inputs}
        <button type="submit">Analyze Crop</button>
    </form>

    <div id="message" class="warning hidden"></div>

    <section id="results" class="hidden">
        <img id="preview" alt="Uploaded Leaf">
        <h2>Results</h2>
        <p><strong>Detected Condition:</strong> <span id="condition"></span></p>
        <p><strong>Disease Confidence:</strong> <span id="disease-confidence"></span></p>
        <p><strong>Environmental Suitability Score:</strong> <span id="suitability-score"></span></p>
        <hr>
        <h3>Overall Status: <strong id="status"></strong></h3>
        <p><strong>Final Score:</strong> <span id="final-score"></span></p>
        <p><strong>Recommendation:</strong> <span id="recommendation"></span></p>
    </section>

    <script>
        const form = document.getElementById('analyze-form');
        const message = document.getElementById('message');
        const results = document.getElementById('results');

        function showMessage(text) {{
            message.textContent = text;
            message.classList.remove('hidden');
        }}

        form.addEventListener('submit', async (event) => {{
            event.preventDefault();
            message.classList.add('hidden');
            results.classList.add('hidden');

            const file = document.getElementById('image').files[0];
            if (!file) {{
                showMessage('Please upload a leaf image first.');
                return;
            }}

            try {{
                const response = await fetch('/api/analyze', {{
                    method: 'POST',
                    body: new FormData(form),
                }});
                const body = await response.json();
                if (!response.ok) {{
                    showMessage(body.error ? body.error.message : 'Analysis failed');
                    return;
                }}

                document.getElementById('preview').src = URL.createObjectURL(file);
                document.getElementById('condition').textContent = body.condition;
                document.getElementById('disease-confidence').textContent = body.disease_confidence.toFixed(2);
                document.getElementById('suitability-score').textContent = body.suitability_score.toFixed(2);

                const status = document.getElementById('status');
                status.textContent = body.fusion.status;
                status.className = 'status-' + body.fusion.status.replace(' ', '-');
                document.getElementById('final-score').textContent = body.final_score_display;
                document.getElementById('recommendation').textContent = body.fusion.recommendation;
                results.classList.remove('hidden');
            }} catch (err) {{
                showMessage('Request failed: ' + err);
            }}
        }});
    </script>
</body>
</html>
"#,
        inputs = inputs
    )
}

/// GET /
async fn root_page() -> impl IntoResponse {
    Html(render_page())
}
