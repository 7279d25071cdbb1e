//! The HTML upload form served at `/`.

use std::fmt::Write;
use std::sync::Arc;

use axum::{extract::Extension, response::Html};
use spectro_common::{Bounds, WindowFunction};

use crate::state::AppState;

const STYLE: &str = r#"
    body { font-family: "Helvetica Neue", Helvetica, Arial, sans-serif; }
    label { display: block; margin-bottom: 0.5em; }
    .box {
        background: #90CAF9;
        margin: 1em auto 0 auto;
        width: 500px;
        padding: 1em;
        box-shadow: 0 3px 6px rgba(0,0,0,0.16), 0 3px 6px rgba(0,0,0,0.23);
    }
    button { margin-left: auto; display: block; }
    h3 { text-align: center; }
"#;

const SCRIPT: &str = r#"
function onUpload() {
    const upload = document.getElementById("upload");
    upload.onchange = () => document.getElementById("form").submit();
    upload.click();
}
"#;

/// GET / - Upload form
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    Html(render_index(state.window_selection()))
}

/// Render the form; the window selector only appears when clients may
/// choose one.
pub fn render_index(window_selection: bool) -> String {
    let mut fields = String::new();
    number_field(&mut fields, "x", "X", 3000, Bounds::WIDTH_MIN, Bounds::WIDTH_MAX);
    number_field(&mut fields, "y", "Y", 500, Bounds::HEIGHT_MIN, Bounds::HEIGHT_MAX);
    number_field(
        &mut fields,
        "z",
        "Z",
        100,
        Bounds::DYNAMIC_RANGE_MIN,
        Bounds::DYNAMIC_RANGE_MAX,
    );
    fields.push_str(
        r#"        <label for="label">Label
            <input type="text" name="label" id="label" placeholder="label">
        </label>
"#,
    );

    if window_selection {
        fields.push_str("        <label for=\"window\">Window\n            <select name=\"window\" id=\"window\">\n");
        for window in WindowFunction::ALL {
            let selected = if window == WindowFunction::default() {
                " selected"
            } else {
                ""
            };
            let _ = writeln!(fields, "                <option{}>{}</option>", selected, window);
        }
        fields.push_str("            </select>\n        </label>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Spectrogram</title>
    <style>{style}</style>
</head>
<body>
<div class="box">
    <form method="post" id="form" enctype="multipart/form-data" action="/api/spectrogram">
        <h3>Spectrogram</h3>
{fields}        <input type="file" name="data" id="upload" accept="audio/*" style="display: none">
    </form>
    <button onclick="onUpload()">Upload</button>
</div>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        fields = fields,
        script = SCRIPT,
    )
}

fn number_field(out: &mut String, name: &str, title: &str, value: i64, min: i64, max: i64) {
    let _ = writeln!(
        out,
        r#"        <label for="{name}">{title}
            <input type="number" name="{name}" id="{name}" placeholder="{name}" value="{value}" min="{min}" max="{max}">
        </label>"#,
        name = name,
        title = title,
        value = value,
        min = min,
        max = max,
    );
}
