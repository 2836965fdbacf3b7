//! Routes of the sticker API

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;

use super::http::{Request, Response};
use crate::color::Rgb;
use crate::error::GenerateError;
use crate::generate::{GenerateParams, Generator};

pub const STICKER_ROUTE: &str = "/pjsk-sticker";

/// Dispatch a request to its handler.
pub async fn handle(generator: Arc<Generator>, request: &Request) -> Response {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/") => Response::redirect("/docs"),
        ("GET", "/docs") => Response::html(DOCS_HTML),
        ("GET", "/openapi.json") => Response::json(200, &openapi()),
        ("GET", STICKER_ROUTE) => match params_from_query(&request.query) {
            Ok(params) => generate(generator, params).await,
            Err(message) => Response::detail(400, message),
        },
        ("POST", STICKER_ROUTE) => match params_from_json(&request.body) {
            Ok(params) => generate(generator, params).await,
            Err(message) => Response::detail(400, message),
        },
        (_, "/" | "/docs" | "/openapi.json" | STICKER_ROUTE) => Response::detail(405, "Method Not Allowed"),
        _ => Response::detail(404, "Not Found"),
    }
}

/// Render on the blocking pool, answer with the PNG and remove the file.
async fn generate(generator: Arc<Generator>, params: GenerateParams) -> Response {
    let character = params.character.clone();
    let task = tokio::task::spawn_blocking(move || {
        let mut rng = rand::thread_rng();
        generator.generate(&params, None, &mut rng)
    });

    let path = match task.await {
        Ok(Ok(path)) => path,
        Ok(Err(e)) => {
            tracing::warn!(character = %character, kind = e.kind(), error = %e, "sticker generation failed");
            return Response::detail(e.status_code(), e.to_string());
        }
        Err(e) => {
            let e = GenerateError::Unclassified(format!("generation task failed: {e}"));
            tracing::warn!(character = %character, kind = e.kind(), error = %e, "sticker generation failed");
            return Response::detail(e.status_code(), e.to_string());
        }
    };

    let bytes = tokio::fs::read(&path).await;
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove generated sticker");
    }
    match bytes {
        Ok(bytes) => Response::png(bytes),
        Err(e) => Response::detail(500, format!("IO error: {e}")),
    }
}

/// Query parameters, tuple-valued ones repeated (`position=20&position=10`).
///
/// Empty values count as absent.
pub fn params_from_query(query: &str) -> Result<GenerateParams, String> {
    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        values.entry(key.into_owned()).or_default().push(value.into_owned());
    }

    let single = |name: &str| values.get(name).and_then(|v| v.last()).map(String::as_str);
    let required =
        |name: &str| single(name).map(str::to_string).ok_or_else(|| format!("Missing required parameter '{name}'"));

    let mut params = GenerateParams::new(required("character")?, required("text")?);
    if let Some(v) = single("character_index") {
        params.character_index = Some(parse_number("character_index", v)?);
    }
    if let Some(v) = values.get("position") {
        let [x, y] = parse_tuple::<i32, 2>("position", v)?;
        params.position = (x, y);
    }
    if let Some(v) = values.get("text_color") {
        params.text_color = Some(Rgb(parse_tuple("text_color", v)?));
    }
    if let Some(v) = single("font_size") {
        params.font_size = parse_number("font_size", v)?;
    }
    if let Some(v) = values.get("stroke_color") {
        params.stroke_color = Rgb(parse_tuple("stroke_color", v)?);
    }
    if let Some(v) = single("stroke_width") {
        params.stroke_width = parse_number("stroke_width", v)?;
    }
    params.font_path = single("font_path").map(str::to_string);
    if let Some(v) = single("rotation_angle") {
        params.rotation_angle = parse_number("rotation_angle", v)?;
    }
    Ok(params)
}

/// JSON request body.
pub fn params_from_json(body: &[u8]) -> Result<GenerateParams, String> {
    serde_json::from_slice(body).map_err(|e| format!("Invalid request body: {e}"))
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, String> {
    value.trim().parse().map_err(|_| format!("Parameter '{name}' must be an integer in range, got '{value}'"))
}

/// A fixed-size tuple from repeated values, or one comma-separated value.
fn parse_tuple<T: FromStr + Copy + Default, const N: usize>(name: &str, values: &[String]) -> Result<[T; N], String> {
    let parts: Vec<&str> = match values {
        [single] => single.split(',').collect(),
        many => many.iter().map(String::as_str).collect(),
    };
    if parts.len() != N {
        return Err(format!("Parameter '{name}' needs {N} values, got {}", parts.len()));
    }

    let mut out = [T::default(); N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = parse_number(name, part)?;
    }
    Ok(out)
}

/// Machine-readable API description.
pub fn openapi() -> serde_json::Value {
    let int = json!({ "type": "integer" });
    let pair = json!({ "type": "array", "items": int, "minItems": 2, "maxItems": 2 });
    let rgb = json!({ "type": "array", "items": int, "minItems": 3, "maxItems": 3 });
    let detail = json!({
        "type": "object",
        "properties": { "detail": { "type": "string" } },
        "required": ["detail"]
    });
    let responses = json!({
        "200": { "description": "Generated sticker", "content": { "image/png": {} } },
        "400": { "description": "Malformed parameters", "content": { "application/json": { "schema": detail } } },
        "404": { "description": "Character or team not found", "content": { "application/json": { "schema": detail } } },
        "500": { "description": "Missing resource or rendering failure", "content": { "application/json": { "schema": detail } } }
    });

    let query = |name: &str, schema: &serde_json::Value, required: bool, description: &str| {
        json!({
            "name": name,
            "in": "query",
            "required": required,
            "schema": schema,
            "description": description,
        })
    };

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "PJSK Sticker API",
            "description": "Generate Project Sekai style stickers from GET query parameters or a POST JSON body.",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            STICKER_ROUTE: {
                "get": {
                    "summary": "Generate a sticker from query parameters",
                    "description": "Tuple parameters are repeated, e.g. `&position=20&position=10`.",
                    "parameters": [
                        query("character", &json!({ "type": "string" }), true, "Character or team name, e.g. 'miku', 'l/n'"),
                        query("text", &json!({ "type": "string" }), true, "Text drawn on the sticker"),
                        query("character_index", &int, false, "1-based sticker index; random when omitted"),
                        query("position", &pair, false, "Top-left text position (x, y), default (20, 10)"),
                        query("text_color", &rgb, false, "Text color (r, g, b); the character's color when omitted"),
                        query("font_size", &int, false, "Font size in pixels, default 50"),
                        query("stroke_color", &rgb, false, "Outline color (r, g, b), default white"),
                        query("stroke_width", &int, false, "Outline width in pixels, default 4"),
                        query("font_path", &json!({ "type": "string" }), false, "Font name, matched approximately"),
                        query("rotation_angle", &int, false, "Counter-clockwise rotation in degrees, default 15"),
                    ],
                    "responses": responses,
                },
                "post": {
                    "summary": "Generate a sticker from a JSON body",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/GenerateRequest" } } }
                    },
                    "responses": responses,
                }
            }
        },
        "components": {
            "schemas": {
                "GenerateRequest": {
                    "type": "object",
                    "required": ["character", "text"],
                    "properties": {
                        "character": { "type": "string" },
                        "text": { "type": "string" },
                        "character_index": { "type": ["integer", "null"] },
                        "position": pair,
                        "text_color": { "anyOf": [rgb, { "type": "null" }] },
                        "font_size": { "type": "integer", "default": 50 },
                        "stroke_color": rgb,
                        "stroke_width": { "type": "integer", "default": 4 },
                        "font_path": { "type": ["string", "null"] },
                        "rotation_angle": { "type": "integer", "default": 15 }
                    },
                    "example": { "character": "miku", "text": "你好！", "font_size": 60, "rotation_angle": -10 }
                }
            }
        }
    })
}

const DOCS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PJSK Sticker API</title>
<style>
body { font-family: sans-serif; max-width: 44rem; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin-top: .6rem; }
input { width: 6rem; }
input.wide { width: 20rem; }
code { background: #f2f2f2; padding: 0 .2rem; }
</style>
</head>
<body>
<h1>PJSK Sticker API</h1>
<p><code>GET /pjsk-sticker</code> takes query parameters, repeating tuple values
(<code>&amp;position=20&amp;position=10</code>). <code>POST /pjsk-sticker</code> takes the
same fields as a JSON body. Both answer with <code>image/png</code>.
The schema is at <a href="/openapi.json">/openapi.json</a>.</p>
<form method="get" action="/pjsk-sticker">
<label>character <input class="wide" name="character" value="miku" required></label>
<label>text <input class="wide" name="text" value="你好！" required></label>
<label>character_index <input name="character_index" type="number"></label>
<label>position <input name="position" type="number" value="20"> <input name="position" type="number" value="10"></label>
<label>text_color <input name="text_color" type="number"> <input name="text_color" type="number"> <input name="text_color" type="number"></label>
<label>font_size <input name="font_size" type="number" value="50"></label>
<label>stroke_color <input name="stroke_color" type="number" value="255"> <input name="stroke_color" type="number" value="255"> <input name="stroke_color" type="number" value="255"></label>
<label>stroke_width <input name="stroke_width" type="number" value="4"></label>
<label>font_path <input class="wide" name="font_path"></label>
<label>rotation_angle <input name="rotation_angle" type="number" value="15"></label>
<p><button type="submit">Generate</button></p>
</form>
</body>
</html>
"#;
