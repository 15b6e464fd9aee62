use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SurveyError;

/// The expense form shipped with the application
pub const DEFAULT_DEFINITION: &str = include_str!("./static/survey.json");

/// Declarative description of a survey
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_view: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    #[serde(rename = "matrixdynamic")]
    MatrixDynamic(MatrixDynamic),
    Panel(Panel),
    Expression(ExpressionQuestion),
    Text(TextQuestion),
}

impl Element {
    pub fn name(&self) -> &str {
        match self {
            Element::MatrixDynamic(m) => &m.name,
            Element::Panel(p) => &p.name,
            Element::Expression(e) => &e.name,
            Element::Text(t) => &t.name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatrixDynamic {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_row_button_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_row_text: Option<String>,
}

impl MatrixDynamic {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(default = "default_cell_type")]
    pub cell_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

fn default_cell_type() -> String {
    "text".to_string()
}

impl Column {
    pub fn is_dropdown(&self) -> bool {
        self.cell_type == "dropdown"
    }

    pub fn is_numeric(&self) -> bool {
        self.input_type.as_deref() == Some("number")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    pub value: Value,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Read-only question whose value is an expression result
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionQuestion {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_location: Option<String>,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextQuestion {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_value_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<String>,
}

impl SurveyDefinition {
    pub fn from_json(json: &str) -> Result<Self, SurveyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SurveyError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Every element in document order, panels flattened
    pub fn all_elements(&self) -> Vec<&Element> {
        fn walk<'a>(elements: &'a [Element], out: &mut Vec<&'a Element>) {
            for element in elements {
                out.push(element);
                if let Element::Panel(panel) = element {
                    walk(&panel.elements, out);
                }
            }
        }

        let mut out = Vec::new();
        for page in &self.pages {
            walk(&page.elements, &mut out);
        }
        out
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.all_elements().into_iter().find(|e| e.name() == name)
    }

    pub fn matrix(&self, name: &str) -> Result<&MatrixDynamic, SurveyError> {
        match self.find(name) {
            Some(Element::MatrixDynamic(m)) => Ok(m),
            Some(_) => Err(SurveyError::NotAMatrix(name.to_string())),
            None => Err(SurveyError::UnknownQuestion(name.to_string())),
        }
    }
}

impl Default for SurveyDefinition {
    fn default() -> Self {
        // DEFAULT_DEFINITION is parsed in the definition tests
        serde_json::from_str(DEFAULT_DEFINITION).expect("embedded survey definition is valid")
    }
}
