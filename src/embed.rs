// 🪟 Embedding - Iframe height reporting and framing policy
//
// When the dashboard runs inside a frame it posts its content height to
// exactly one parent origin. The server advertises the same origin in the
// frame-ancestors policy.

use crate::config::DEFAULT_PARENT_ORIGIN;
use serde::{Deserialize, Serialize};

/// `{"type":"iframe-resize","height":N}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "iframe-resize")]
pub struct ResizeMessage {
    pub height: u32,
}

impl ResizeMessage {
    pub fn new(height: u32) -> Self {
        ResizeMessage { height }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPolicy {
    parent_origin: String,
}

impl EmbedPolicy {
    pub fn new(parent_origin: impl Into<String>) -> Self {
        EmbedPolicy {
            parent_origin: parent_origin.into(),
        }
    }

    pub fn parent_origin(&self) -> &str {
        &self.parent_origin
    }

    /// `https://host` -> `https://*.host`
    pub fn subdomain_wildcard(&self) -> Option<String> {
        let (scheme, host) = self.parent_origin.split_once("://")?;
        if host.is_empty() {
            return None;
        }
        Some(format!("{}://*.{}", scheme, host))
    }

    pub fn content_security_policy(&self) -> String {
        let mut ancestors = vec!["'self'".to_string(), self.parent_origin.clone()];
        if let Some(wildcard) = self.subdomain_wildcard() {
            ancestors.push(wildcard);
        }
        format!("frame-ancestors {};", ancestors.join(" "))
    }

    /// Script that detects framing and reports height on load and resize
    pub fn resize_script(&self) -> String {
        let origin = serde_json::to_string(&self.parent_origin).unwrap_or_else(|_| "\"\"".to_string());

        format!(
            r#"(function () {{
  var PARENT_ORIGIN = {origin};
  if (window === window.top) {{ return; }}
  document.body.classList.add("embedded");
  function report() {{
    var height = document.documentElement.scrollHeight;
    window.parent.postMessage({{ type: "iframe-resize", height: height }}, PARENT_ORIGIN);
  }}
  window.addEventListener("load", report);
  window.addEventListener("resize", report);
  if (window.ResizeObserver) {{ new ResizeObserver(report).observe(document.body); }}
  report();
}})();"#
        )
    }

    /// Minimal host page for the HTTP surface
    pub fn shell_page(&self, title: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; }}
body.embedded {{ margin: 0.5rem; }}
code {{ background: #f3f4f6; padding: 0 0.25rem; }}
</style>
</head>
<body>
<h1>{title}</h1>
<ul>
<li><a href="/api/kpis"><code>/api/kpis</code></a></li>
<li><a href="/api/forecast"><code>/api/forecast</code></a></li>
<li><a href="/api/cashflow"><code>/api/cashflow</code></a></li>
<li><a href="/api/pipeline"><code>/api/pipeline</code></a></li>
<li><a href="/api/macro"><code>/api/macro</code></a></li>
<li><a href="/api/invoices"><code>/api/invoices</code></a></li>
<li><a href="/api/compliance"><code>/api/compliance</code></a></li>
<li><a href="/api/compliance/audit">Download AI audit report</a></li>
</ul>
<script>
{script}
</script>
</body>
</html>
"#,
            title = title,
            script = self.resize_script()
        )
    }
}

impl Default for EmbedPolicy {
    fn default() -> Self {
        EmbedPolicy::new(DEFAULT_PARENT_ORIGIN)
    }
}
