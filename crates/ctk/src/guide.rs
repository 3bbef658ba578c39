//! Texts guiding the user after a data load.

/// Success and error texts referencing the cluster URL.
#[derive(Debug, Clone)]
pub struct GuidingTexts {
    admin_url: String,
    table_name: String,
}

impl GuidingTexts {
    pub fn new(admin_url: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            admin_url: admin_url.into(),
            table_name: table_name.into(),
        }
    }

    pub fn success(&self) -> String {
        format!(
            "\n\nExcellent, that worked well.\n\n\
             Now, you may want to inspect your data. To do that, use the\n\
             Admin UI at {url} or run:\n\n    \
             SELECT * FROM \"{table}\" LIMIT 10;\n",
            url = self.admin_url,
            table = self.table_name,
        )
    }

    pub fn error(&self) -> String {
        format!(
            "\n\nThat went south.\n\n\
             Please inspect the job details in the Cloud Console, or the\n\
             cluster at {url}, and check that the source is reachable and\n\
             in the format and compression you specified.\n",
            url = self.admin_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texts_reference_url() {
        let texts = GuidingTexts::new("https://testdrive.example.net:4200", "basic");
        assert!(texts.success().contains("https://testdrive.example.net:4200"));
        assert!(texts.success().contains(r#"SELECT * FROM "basic""#));
        assert!(texts.error().contains("https://testdrive.example.net:4200"));
    }
}
