use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::models::{AppState, PageQuery};
use crate::utils::crypto::verify_token;
use crate::utils::html::escape_html;
use crate::validation::{sanitize_folder, DEFAULT_FOLDER};

const INVALID_FOLDER_TEXT: &str = "Invalid folder name. Allowed: letters, numbers, underscore, dash.";

const TOKEN_WARNING: &str = r#"<div class="token-warning">
      Hint: add your token above and click "Apply (update URL)", or make sure your browser auto-fills it.
    </div>"#;

/// GET / - upload page, pre-filled from `?folder=` and `?token=`
pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let Some(folder) = sanitize_folder(query.folder.as_deref().unwrap_or(DEFAULT_FOLDER)) else {
        return (StatusCode::BAD_REQUEST, INVALID_FOLDER_TEXT).into_response();
    };

    let upload = &state.config.upload;
    let token = query.token.unwrap_or_default();
    let page = PageContext {
        folder: &folder,
        token: &token,
        asset_root_web: &upload.asset_root_web,
        allowed_extensions: &upload.allowed_extensions,
        has_valid_token: verify_token(&upload.token, &token),
    };

    Html(render_page(&page)).into_response()
}

pub struct PageContext<'a> {
    pub folder: &'a str,
    pub token: &'a str,
    pub asset_root_web: &'a str,
    pub allowed_extensions: &'a [String],
    pub has_valid_token: bool,
}

pub fn render_page(page: &PageContext<'_>) -> String {
    let asset_path = format!("{}/{}", page.asset_root_web, page.folder);
    let allowed = page.allowed_extensions.join(", ");

    // single pass, so substituted values are never rescanned for placeholders
    let mut out = String::with_capacity(PAGE_TEMPLATE.len() + 256);
    let mut rest = PAGE_TEMPLATE;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        match &after[..end] {
            "ASSET_ROOT" => out.push_str(&escape_html(page.asset_root_web)),
            "ASSET_PATH" => out.push_str(&escape_html(&asset_path)),
            "FOLDER" => out.push_str(&escape_html(page.folder)),
            "TOKEN" => out.push_str(&escape_html(page.token)),
            "ALLOWED" => out.push_str(&escape_html(&allowed)),
            "TOKEN_WARNING" if !page.has_valid_token => out.push_str(TOKEN_WARNING),
            "TOKEN_WARNING" => {}
            other => {
                out.push_str("{{");
                out.push_str(other);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>EZ Drop &amp; Paste</title>
  <style>
    body { font-family: system-ui, -apple-system, "Segoe UI", sans-serif; max-width: 800px; margin: 20px auto; padding: 0 12px; }
    .info { font-size: 14px; margin-bottom: 12px; }
    .token-warning { color: red; font-weight: bold; }
    .config-row { display: flex; flex-wrap: wrap; gap: 8px; align-items: center; margin-bottom: 12px; }
    .config-row label { font-size: 13px; }
    .config-row input { padding: 4px 8px; font-size: 14px; }
    .dropzone { border: 2px dashed #999; border-radius: 8px; padding: 30px; text-align: center; cursor: pointer; margin-bottom: 16px; }
    .dropzone.dragover { border-color: #333; background: #f8f8f8; }
    .preview-item { border: 1px solid #ddd; border-radius: 6px; padding: 10px; margin-bottom: 12px; }
    .preview-item img { max-width: 40%; height: auto; display: block; margin-top: 8px; }
    .codes { font-family: Menlo, Monaco, "Courier New", monospace; font-size: 14px; background: #f5f5f5; padding: 6px; border-radius: 4px; margin-bottom: 4px; display: flex; align-items: center; gap: 6px; }
    .codes input, .codes textarea { flex: 1 1 auto; border: none; background: transparent; font: inherit; resize: none; outline: none; color: #003366; }
    .copy-btn { font-size: 12px; padding: 4px 8px; border-radius: 4px; border: 1px solid #999; background: #e0e0ff; cursor: pointer; }
    .upload-progress { font-size: 13px; color: #666; margin-top: 4px; }
    button { padding: 8px 14px; border-radius: 6px; border: 1px solid #999; background: #f0f0f0; cursor: pointer; }
  </style>
</head>
<body data-asset-root="{{ASSET_ROOT}}">
  <h1>EZ Drop &amp; Paste</h1>

  <div class="config-row">
    <label>Folder: <input type="text" id="folderInput" value="{{FOLDER}}" placeholder="myfolder"></label>
    <label>Token: <input type="password" id="tokenInput" value="{{TOKEN}}" placeholder="your-secret-token"></label>
    <button id="applyUrlBtn" type="button">Apply (update URL)</button>
  </div>

  <div class="info">
    <div>Current folder: <strong id="currentFolderLabel">{{FOLDER}}</strong></div>
    <div>Uploads will go to: <code id="pathLabel">{{ASSET_PATH}}</code></div>
    <div>Allowed types: {{ALLOWED}}</div>
    {{TOKEN_WARNING}}
  </div>

  <div id="dropzone" class="dropzone">
    <p><strong>Drag &amp; drop</strong> files here or click to choose.</p>
    <p>After upload you get the URL, an HTML &lt;img&gt; tag and Markdown.</p>
    <input id="fileInput" type="file" style="display:none;" accept="image/*">
  </div>
  <button id="chooseBtn" type="button">Choose File</button>

  <div id="preview"></div>

  <script>
  (function () {
    const $ = (id) => document.getElementById(id);
    const dropzone = $('dropzone'), fileInput = $('fileInput'), previewBox = $('preview');
    const folderInput = $('folderInput'), tokenInput = $('tokenInput');
    const assetRoot = document.body.dataset.assetRoot;

    const currentFolder = () => folderInput.value.trim() || 'default';
    const currentToken = () => tokenInput.value.trim();

    function updateLabels() {
      $('currentFolderLabel').textContent = currentFolder();
      $('pathLabel').textContent = assetRoot + '/' + currentFolder();
    }

    function updateUrlQuery() {
      const params = new URLSearchParams(window.location.search);
      params.set('folder', currentFolder());
      if (currentToken() !== '') { params.set('token', currentToken()); } else { params.delete('token'); }
      history.replaceState(null, '', window.location.pathname + '?' + params.toString());
    }

    function copyRow(value, multiline) {
      const row = document.createElement('div');
      row.className = 'codes';
      const field = document.createElement(multiline ? 'textarea' : 'input');
      field.readOnly = true;
      if (multiline) { field.rows = 2; }
      field.value = value;
      const btn = document.createElement('button');
      btn.type = 'button';
      btn.className = 'copy-btn';
      btn.textContent = 'Copy';
      btn.addEventListener('click', () => {
        navigator.clipboard.writeText(field.value).then(() => {
          btn.textContent = 'Copied!';
          setTimeout(() => { btn.textContent = 'Copy'; }, 800);
        }).catch(() => alert('Failed to copy.'));
      });
      row.append(field, btn);
      return row;
    }

    function addPreview(item, name, data) {
      item.replaceChildren();
      const title = document.createElement('div');
      title.textContent = name + ' → ' + data.url;
      const img = document.createElement('img');
      img.src = data.url;
      item.append(title, copyRow(data.url, false), copyRow(data.html, true), copyRow(data.markdown, true), img);
    }

    function uploadFile(file) {
      if (currentToken() === '') { alert('Token is empty. Please enter your token first.'); return; }

      const form = new FormData();
      form.append('file', file);
      form.append('folder', currentFolder());
      form.append('token', currentToken());

      const item = document.createElement('div');
      item.className = 'preview-item';
      const progress = document.createElement('div');
      progress.className = 'upload-progress';
      progress.textContent = file.name + ': uploading... 0%';
      item.appendChild(progress);
      previewBox.prepend(item);

      const xhr = new XMLHttpRequest();
      xhr.open('POST', window.location.pathname, true);
      xhr.upload.onprogress = (e) => {
        if (e.lengthComputable) {
          progress.textContent = file.name + ': uploading... ' + Math.round(e.loaded / e.total * 100) + '%';
        }
      };
      xhr.onload = () => {
        let data = null;
        try { data = JSON.parse(xhr.responseText); } catch (e) { /* not JSON */ }
        if (data && data.success) { addPreview(item, file.name, data); return; }
        item.remove();
        alert('Upload failed: ' + ((data && data.error) || ('HTTP ' + xhr.status)));
      };
      xhr.onerror = () => { item.remove(); alert('Upload error.'); };
      xhr.send(form);
    }

    const handleFiles = (files) => { for (const f of files) { uploadFile(f); } };

    dropzone.addEventListener('click', () => fileInput.click());
    $('chooseBtn').addEventListener('click', () => fileInput.click());
    dropzone.addEventListener('dragover', (e) => { e.preventDefault(); dropzone.classList.add('dragover'); });
    dropzone.addEventListener('dragleave', (e) => { e.preventDefault(); dropzone.classList.remove('dragover'); });
    dropzone.addEventListener('drop', (e) => {
      e.preventDefault();
      dropzone.classList.remove('dragover');
      if (e.dataTransfer.files.length > 0) { handleFiles(e.dataTransfer.files); }
    });
    fileInput.addEventListener('change', (e) => {
      if (e.target.files.length > 0) { handleFiles(e.target.files); fileInput.value = ''; }
    });
    $('applyUrlBtn').addEventListener('click', () => { updateLabels(); updateUrlQuery(); });
    folderInput.addEventListener('input', updateLabels);
    updateLabels();
  })();
  </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_render_page_prefills_and_escapes() {
        let allowed = allowed();
        let html = render_page(&PageContext {
            folder: "team-a",
            token: "a\"b<c",
            asset_root_web: "/ezassets",
            allowed_extensions: &allowed,
            has_valid_token: false,
        });

        assert!(html.contains(r#"id="folderInput" value="team-a""#));
        assert!(html.contains(r#"value="a&quot;b&lt;c""#));
        assert!(html.contains("<code id=\"pathLabel\">/ezassets/team-a</code>"));
        assert!(html.contains("Allowed types: jpg, png"));
        assert!(html.contains("Hint: add your token"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_page_hides_warning_with_valid_token() {
        let allowed = allowed();
        let html = render_page(&PageContext {
            folder: "foo",
            token: "secret",
            asset_root_web: "/ezassets",
            allowed_extensions: &allowed,
            has_valid_token: true,
        });
        assert!(!html.contains("Hint: add your token"));
    }

    #[test]
    fn test_render_page_does_not_expand_placeholders_in_values() {
        let allowed = allowed();
        let html = render_page(&PageContext {
            folder: "foo",
            token: "{{ALLOWED}}",
            asset_root_web: "/ezassets",
            allowed_extensions: &allowed,
            has_valid_token: false,
        });
        assert!(html.contains(r#"id="tokenInput" value="{{ALLOWED}}""#));
    }
}
