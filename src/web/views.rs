//! Server-rendered views backed by compiled-in minijinja templates.

use crate::web::error::PageError;
use axum::response::Html;
use minijinja::{context, Environment, Value};

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        env.add_template("signup.html", include_str!("../../templates/signup.html"))?;
        env.add_template("login.html", include_str!("../../templates/login.html"))?;
        env.add_template("index.html", include_str!("../../templates/index.html"))?;
        env.add_template(
            "add-task.html",
            include_str!("../../templates/add-task.html"),
        )?;
        env.add_template(
            "edit-task.html",
            include_str!("../../templates/edit-task.html"),
        )?;
        Ok(Self { env })
    }

    pub fn render(&self, name: &str, ctx: Value) -> Result<Html<String>, PageError> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}

/// The 404 page. Static content, rendered from a throwaway environment so it
/// stays available to responses that have no access to shared state.
pub fn not_found_page() -> Html<String> {
    render_static(
        include_str!("../../templates/404.html"),
        "Page Not Found",
    )
}

/// The generic 500 page. Never carries internal error detail.
pub fn server_error_page() -> Html<String> {
    render_static(include_str!("../../templates/500.html"), "Server Error")
}

fn render_static(source: &str, title: &str) -> Html<String> {
    let env = Environment::new();
    let rendered = env
        .render_str(source, context! { title })
        .unwrap_or_else(|_| format!("<h1>{title}</h1>"));
    Html(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_compile() {
        let views = Views::new().unwrap();
        let page = views
            .render(
                "signup.html",
                context! { error => Option::<String>::None, errors => Vec::<String>::new() },
            )
            .unwrap();
        assert!(page.0.contains("<form"));
    }

    #[test]
    fn test_error_pages_render() {
        assert!(not_found_page().0.contains("Page Not Found"));
        assert!(server_error_page().0.contains("Server Error"));
    }
}
