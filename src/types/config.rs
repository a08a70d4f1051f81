use serde::{Deserialize, Serialize};

/// Document properties written to `docProps/core.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocProps {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub created_by: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub category: Option<String>,
    pub revision: Option<String>,
}

impl DocProps {
    /// `(element name, value)` for every property that is set.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("dc:title", &self.title),
            ("dc:subject", &self.subject),
            ("cp:keywords", &self.keywords),
            ("dc:creator", &self.created_by),
            ("dc:description", &self.description),
            ("cp:lastModifiedBy", &self.last_modified_by),
            ("cp:category", &self.category),
            ("cp:revision", &self.revision),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// Renames applied to the template's table and sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateSettings {
    pub table_name: Option<String>,
    pub sheet_name: Option<String>,
}

/// Optional inputs for workbook generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileConfigs {
    /// Custom template bytes; the built-in template is used when absent.
    #[serde(skip)]
    pub template_file: Option<Vec<u8>>,
    pub doc_props: Option<DocProps>,
    pub template_settings: Option<TemplateSettings>,
}
