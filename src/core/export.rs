// ConsoleWatch - core/export.rs
//
// Snapshot export of the rendered console.
// Core layer: writes to any Write trait object.

use crate::core::escape::{escape_markup, unescape_markup};
use crate::core::model::DisplayState;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export the rendered console as a standalone HTML page.
///
/// The rendered buffer is already display-safe markup, so it is embedded in a
/// `<pre>` block verbatim. Returns the number of bytes of console markup
/// written.
pub fn export_html<W: Write>(
    state: &DisplayState,
    source_url: &str,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    };
    let title = escape_markup(source_url);

    write!(
        writer,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n\
         <p>Console of {title}, cursor {}</p>\n<pre>",
        state.cursor()
    )
    .map_err(io_err)?;
    writer
        .write_all(state.rendered().as_bytes())
        .map_err(io_err)?;
    writer
        .write_all(b"</pre>\n</body>\n</html>\n")
        .map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    Ok(state.rendered().len())
}

/// Export the rendered console as plain text with markup decoded.
pub fn export_text<W: Write>(
    state: &DisplayState,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let text = unescape_markup(state.rendered());
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            source: e,
        })?;
    Ok(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{FetchResponse, PollTimings};
    use crate::core::surface::Viewport;
    use crate::core::update::apply_update;
    use std::path::PathBuf;

    fn state_with(text: &str) -> DisplayState {
        let mut state = DisplayState::new();
        let mut vp = Viewport::default();
        let resp = FetchResponse::new(0, text.len() as u64, text);
        apply_update(&mut state, &mut vp, Some(&resp), &PollTimings::default());
        state
    }

    #[test]
    fn test_html_export_embeds_escaped_markup() {
        let state = state_with("temp <25C> & rising\r\n");
        let mut buf = Vec::new();
        let count = export_html(
            &state,
            "http://esp-link.local/console/text",
            &mut buf,
            &PathBuf::from("out.html"),
        )
        .unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert_eq!(count, state.rendered().len());
        assert!(output.contains("<pre>temp &lt;25C&gt; &amp; rising"));
        assert!(output.contains("<title>http://esp-link.local/console/text</title>"));
        assert!(!output.contains("<25C>"));
    }

    #[test]
    fn test_text_export_decodes_markup() {
        let state = state_with("if (a < b) \"ok\"");
        let mut buf = Vec::new();
        export_text(&state, &mut buf, &PathBuf::from("out.txt")).unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, "if (a < b) \"ok\"");
    }
}
