use crate::capabilities::TemplateManager;
use anyhow::Context;
use minijinja::Environment;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A loaded template bound to its data
///
/// Rendering is deferred so an action can hand the template to the caller
/// (or to `response()`) and still add data until the last moment.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    env: Arc<Environment<'static>>,
    context: Map<String, Value>,
}

impl Template {
    /// Bind a template of `env` to `context`
    #[must_use]
    pub fn new(env: Arc<Environment<'static>>, name: &str, context: Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            env,
            context,
        }
    }

    /// Template path
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data the template renders with
    #[must_use]
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Add or replace one context entry
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Render to a string
    ///
    /// # Errors
    ///
    /// Returns the template engine error if rendering fails.
    pub fn render(&self) -> Result<String, minijinja::Error> {
        self.env
            .get_template(&self.name)?
            .render(Value::Object(self.context.clone()))
    }
}

/// Template manager loading minijinja templates from a directory
///
/// Template names are paths relative to the base directory; names escaping it
/// (`..`, absolute paths) are treated as missing.
pub struct MiniJinjaTemplates {
    env: Arc<Environment<'static>>,
}

fn map_path(base_dir: &Path, name: &str) -> Option<PathBuf> {
    let mut pb = base_dir.to_path_buf();
    for comp in Path::new(name.trim_start_matches('/')).components() {
        match comp {
            Component::Normal(s) => pb.push(s),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(pb)
}

impl MiniJinjaTemplates {
    /// Create a manager serving templates from `base`
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        let base_dir: PathBuf = base.into();
        let mut env = Environment::new();
        env.set_loader(move |name| {
            let Some(path) = map_path(&base_dir, name) else {
                return Ok(None);
            };
            match fs::read_to_string(&path) {
                Ok(source) => Ok(Some(source)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(minijinja::Error::new(
                    minijinja::ErrorKind::InvalidOperation,
                    "could not read template",
                )
                .with_source(err)),
            }
        });
        Self { env: Arc::new(env) }
    }

    /// Underlying environment
    #[must_use]
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }
}

impl TemplateManager for MiniJinjaTemplates {
    fn load(&self, path: &str, data: Map<String, Value>) -> anyhow::Result<Template> {
        self.env
            .get_template(path)
            .with_context(|| format!("template '{}' is not available", path))?;
        Ok(Template::new(Arc::clone(&self.env), path, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_path_prevents_traversal() {
        let base = Path::new("templates");
        assert!(map_path(base, "../Cargo.toml").is_none());
        assert!(map_path(base, "pages/../../secret").is_none());
        assert_eq!(
            map_path(base, "/pages/./index.html"),
            Some(PathBuf::from("templates/pages/index.html"))
        );
    }

    #[test]
    fn test_load_and_render() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.html"), "<h1>Hello {{ name }}!</h1>").unwrap();
        let templates = MiniJinjaTemplates::new(dir.path());

        let mut data = Map::new();
        data.insert("name".to_string(), json!("World"));
        let tpl = templates.load("hello.html", data).unwrap();
        assert_eq!(tpl.render().unwrap(), "<h1>Hello World!</h1>");
        assert_eq!(
            tpl.with("name", "Again").render().unwrap(),
            "<h1>Hello Again!</h1>"
        );
    }

    #[test]
    fn test_missing_template_fails_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let templates = MiniJinjaTemplates::new(dir.path());
        assert!(templates.load("nope.html", Map::new()).is_err());
        assert!(templates.load("../escape.html", Map::new()).is_err());
    }
}
