//! Page rendering.
//!
//! The template set is loaded once at startup into an immutable
//! [`Templates`] handle and shared by every request. Two templates exist:
//! `view` and `edit`. Both receive the page as `title` and `body`.
//!
//! Built-in templates are compiled into the binary. A template directory
//! containing `view.html` and `edit.html` replaces them.
//!
//! Undefined values are strict: a template that references a field the page
//! does not provide fails at render time instead of printing nothing.

use std::path::{Path, PathBuf};

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use wiki_storage::Page;

const BUILTIN_VIEW: &str = include_str!("../templates/view.html");
const BUILTIN_EDIT: &str = include_str!("../templates/edit.html");

/// The templates a handler can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplateName {
    View,
    Edit,
}

impl TemplateName {
    const ALL: [Self; 2] = [Self::View, Self::Edit];

    /// File name, also used as the template name inside the environment.
    /// The `.html` suffix turns on HTML auto-escaping.
    fn file_name(self) -> &'static str {
        match self {
            Self::View => "view.html",
            Self::Edit => "edit.html",
        }
    }
}

/// Error loading the template set at startup.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template file could not be read.
    #[error("Failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template source does not compile.
    #[error("Invalid template {name}: {source}")]
    Compile {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Error executing a template for one request.
#[derive(Debug, thiserror::Error)]
#[error("Failed to render {template}: {source}")]
pub struct RenderError {
    template: &'static str,
    #[source]
    source: minijinja::Error,
}

/// Immutable, compiled template set.
pub struct Templates {
    env: Environment<'static>,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}

impl Templates {
    /// Load templates from `dir`, or the built-in set when `dir` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if either template cannot be read or compiled.
    pub fn load(dir: Option<&Path>) -> Result<Self, TemplateError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    /// Compile the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if a built-in template fails to compile.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_sources(BUILTIN_VIEW.to_owned(), BUILTIN_EDIT.to_owned())
    }

    /// Read and compile `view.html` and `edit.html` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if either file is missing, unreadable, or
    /// fails to compile.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let read = |name: TemplateName| {
            let path = dir.join(name.file_name());
            std::fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })
        };
        Self::from_sources(read(TemplateName::View)?, read(TemplateName::Edit)?)
    }

    fn from_sources(view: String, edit: String) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        for (name, source) in TemplateName::ALL.into_iter().zip([view, edit]) {
            env.add_template_owned(name.file_name(), source)
                .map_err(|source| TemplateError::Compile {
                    name: name.file_name(),
                    source,
                })?;
        }
        Ok(Self { env })
    }
}

/// Values a template sees.
#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    body: &'a str,
}

/// Merges pages into templates.
#[derive(Debug)]
pub(crate) struct Renderer {
    templates: Templates,
}

impl Renderer {
    pub(crate) fn new(templates: Templates) -> Self {
        Self { templates }
    }

    /// Render `page` with the named template.
    ///
    /// The body is rendered as UTF-8, replacing invalid sequences.
    pub(crate) fn render(&self, name: TemplateName, page: &Page) -> Result<String, RenderError> {
        let template = name.file_name();
        let body = page.body_text();
        let context = PageContext {
            title: &page.title,
            body: &body,
        };
        self.templates
            .env
            .get_template(template)
            .and_then(|t| t.render(context))
            .map_err(|source| RenderError { template, source })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn builtin_renderer() -> Renderer {
        Renderer::new(Templates::builtin().unwrap())
    }

    fn write_templates(dir: &Path, view: &str, edit: &str) {
        fs::write(dir.join("view.html"), view).unwrap();
        fs::write(dir.join("edit.html"), edit).unwrap();
    }

    #[test]
    fn test_builtin_templates_compile() {
        assert!(Templates::builtin().is_ok());
        assert!(Templates::load(None).is_ok());
    }

    #[test]
    fn test_render_view_contains_title_and_body() {
        let html = builtin_renderer()
            .render(TemplateName::View, &Page::new("TestPage", "Hello, TestPage!"))
            .unwrap();

        assert!(html.contains("<h1>TestPage</h1>"));
        assert!(html.contains("<div>Hello, TestPage!</div>"));
        assert!(html.contains("href=\"/edit/TestPage\""));
    }

    #[test]
    fn test_render_edit_prefills_form() {
        let html = builtin_renderer()
            .render(TemplateName::Edit, &Page::new("TestPage", "draft"))
            .unwrap();

        assert!(html.contains("action=\"/save/TestPage\""));
        assert!(html.contains("name=\"body\""));
        assert!(html.contains(">draft</textarea>"));
    }

    #[test]
    fn test_render_escapes_body() {
        let html = builtin_renderer()
            .render(TemplateName::View, &Page::new("Xss", "<script>alert(1)</script>"))
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_invalid_utf8_body() {
        let html = builtin_renderer()
            .render(TemplateName::View, &Page::new("Bin", vec![b'o', 0xff, b'k']))
            .unwrap();

        assert!(html.contains("o\u{fffd}k"));
    }

    #[test]
    fn test_from_dir_overrides_builtin() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_templates(temp_dir.path(), "V:{{ title }}={{ body }}", "E:{{ title }}");

        let renderer = Renderer::new(Templates::load(Some(temp_dir.path())).unwrap());

        let page = Page::new("Custom", "text");
        assert_eq!(renderer.render(TemplateName::View, &page).unwrap(), "V:Custom=text");
        assert_eq!(renderer.render(TemplateName::Edit, &page).unwrap(), "E:Custom");
    }

    #[test]
    fn test_from_dir_missing_template_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("view.html"), "{{ title }}").unwrap();

        let err = Templates::from_dir(temp_dir.path()).unwrap_err();

        assert!(matches!(err, TemplateError::Io { .. }));
        assert!(err.to_string().contains("edit.html"));
    }

    #[test]
    fn test_from_dir_syntax_error_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_templates(temp_dir.path(), "{{ title ", "{{ title }}");

        let err = Templates::from_dir(temp_dir.path()).unwrap_err();

        assert!(matches!(err, TemplateError::Compile { name: "view.html", .. }));
    }

    #[test]
    fn test_render_missing_field_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_templates(temp_dir.path(), "{{ author.name }}", "{{ title }}");
        let renderer = Renderer::new(Templates::from_dir(temp_dir.path()).unwrap());

        let err = renderer
            .render(TemplateName::View, &Page::new("Page", "body"))
            .unwrap_err();

        assert!(err.to_string().contains("view.html"));
        // The other template keeps working
        assert_eq!(
            renderer
                .render(TemplateName::Edit, &Page::new("Page", "body"))
                .unwrap(),
            "Page"
        );
    }
}
