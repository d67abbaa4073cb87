//! Server-rendered HTML via MiniJinja.
//!
//! Templates are compiled into the binary and registered once in a shared
//! environment. Auto-escaping is on for all `.html` templates; wine
//! descriptions are authored in Markdown and pass through the `markdown`
//! filter, which emits pre-escaped safe HTML.

use std::sync::OnceLock;

use actix_web::{HttpResponse, http::StatusCode};
use minijinja::{Environment, Value};
use pulldown_cmark::{Options, Parser, html};

use crate::domain::Error;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/base.html")),
    ("index.html", include_str!("../../../templates/index.html")),
    (
        "wine_detail.html",
        include_str!("../../../templates/wine_detail.html"),
    ),
    ("login.html", include_str!("../../../templates/login.html")),
    (
        "register.html",
        include_str!("../../../templates/register.html"),
    ),
    (
        "my_reviews.html",
        include_str!("../../../templates/my_reviews.html"),
    ),
    (
        "admin/domaines.html",
        include_str!("../../../templates/admin/domaines.html"),
    ),
    (
        "admin/domaine_form.html",
        include_str!("../../../templates/admin/domaine_form.html"),
    ),
    (
        "admin/wines.html",
        include_str!("../../../templates/admin/wines.html"),
    ),
    (
        "admin/wine_form.html",
        include_str!("../../../templates/admin/wine_form.html"),
    ),
];

/// Convert Markdown to HTML with tables and strikethrough enabled.
pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(source, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn markdown_filter(source: &str) -> Value {
    Value::from_safe_string(markdown_to_html(source))
}

/// Format an average rating with two decimal places ("4.33", "2.00").
fn fixed2_filter(value: f64) -> String {
    format!("{value:.2}")
}

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.add_filter("markdown", markdown_filter);
        env.add_filter("fixed2", fixed2_filter);
        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .expect("bundled template parses");
        }
        env
    })
}

/// Render a named template with the given context.
pub fn render(name: &str, ctx: Value) -> Result<String, Error> {
    let template = environment()
        .get_template(name)
        .map_err(|error| Error::internal(format!("unknown template {name}: {error}")))?;
    template
        .render(ctx)
        .map_err(|error| Error::internal(format!("failed to render {name}: {error}")))
}

/// Render a template as a `200 OK` HTML response.
pub fn page(name: &str, ctx: Value) -> Result<HttpResponse, Error> {
    page_with_status(StatusCode::OK, name, ctx)
}

/// Render a template as an HTML response with an explicit status.
///
/// Form re-renders on validation failure keep the user's input on screen
/// while still reporting a 4xx status.
pub fn page_with_status(
    status: StatusCode,
    name: &str,
    ctx: Value,
) -> Result<HttpResponse, Error> {
    let body = render(name, ctx)?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use rstest::rstest;

    #[test]
    fn every_bundled_template_is_registered() {
        for (name, _) in TEMPLATES {
            assert!(
                environment().get_template(name).is_ok(),
                "template {name} missing"
            );
        }
    }

    #[rstest]
    #[case("**bold**", "<strong>bold</strong>")]
    #[case("~~gone~~", "<del>gone</del>")]
    #[case("| a |\n| - |\n| b |", "<table>")]
    fn markdown_supports_the_expected_extensions(#[case] source: &str, #[case] fragment: &str) {
        let rendered = markdown_to_html(source);
        assert!(
            rendered.contains(fragment),
            "expected {fragment:?} in {rendered:?}"
        );
    }

    #[test]
    fn markdown_filter_output_is_not_double_escaped() {
        let rendered = render(
            "wine_detail.html",
            context! {
                current_user => Value::UNDEFINED,
                wine => context! {
                    id => 1,
                    name => "Test",
                    year => 2020,
                    grape => "Gamay",
                    domaine_name => "Domaine Test",
                    region => Value::UNDEFINED,
                    country => Value::UNDEFINED,
                    description_md => "**bold**",
                },
                stats => context! { count => 0, avg => Value::UNDEFINED },
                reviews => Vec::<Value>::new(),
                own_review => Value::UNDEFINED,
            },
        )
        .expect("render detail page");
        assert!(rendered.contains("<strong>bold</strong>"));
    }

    #[test]
    fn template_autoescape_applies_to_plain_values() {
        let rendered = render(
            "index.html",
            context! {
                current_user => Value::UNDEFINED,
                wines => vec![context! {
                    id => 1,
                    name => "<script>alert(1)</script>",
                    year => Value::UNDEFINED,
                    grape => Value::UNDEFINED,
                    domaine_name => "Domaine",
                    reviews_count => 0,
                    avg_rating => Value::UNDEFINED,
                }],
                domaines => Vec::<Value>::new(),
                query => "",
                domaine_id => Value::UNDEFINED,
            },
        )
        .expect("render index");
        assert!(!rendered.contains("<script>alert(1)</script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }
}
