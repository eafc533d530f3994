use tera::Tera;

/// Builds the template engine with the embedded pages. Building at startup
/// surfaces template syntax errors before the server binds.
pub fn engine() -> tera::Result<Tera> {
    let mut tera = Tera::default();

    tera.add_raw_templates([
        ("home.html", include_str!("../templates/home.html")),
        ("docs.html", include_str!("../templates/docs.html")),
    ])?;

    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_parse() {
        let tera = engine().unwrap();
        let names: Vec<_> = tera.get_template_names().collect();
        assert!(names.contains(&"home.html"));
        assert!(names.contains(&"docs.html"));
    }
}
