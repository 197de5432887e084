//! HTML form model
//!
//! Forms are parsed out of a page once, then edited in memory and turned into
//! the name/value pairs a browser would send when a given button is clicked.

use crate::{Result, SubwayError};
use scraper::{ElementRef, Selector};
use url::Url;

/// HTTP method a form submits with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(m) if m.eq_ignore_ascii_case("post") => Self::Post,
            _ => Self::Get,
        }
    }
}

/// Kind of a form control that carries a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Hidden,
    Password,
    Radio,
    Checkbox,
    Select,
    Textarea,
}

/// A named, valued form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub kind: FieldKind,
    /// Only meaningful for radios and checkboxes
    pub checked: bool,
}

impl Field {
    /// Whether this field is part of a submission
    fn is_successful(&self) -> bool {
        match self.kind {
            FieldKind::Radio | FieldKind::Checkbox => self.checked,
            _ => true,
        }
    }
}

/// Kind of a submit control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Submit,
    Image,
    Button,
}

/// A control that submits the form when clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub name: Option<String>,
    pub value: String,
    pub kind: ButtonKind,
}

/// A form lifted out of a page
#[derive(Debug, Clone)]
pub struct Form {
    name: Option<String>,
    id: Option<String>,
    method: Method,
    action: Url,
    page_url: Url,
    fields: Vec<Field>,
    buttons: Vec<Button>,
}

impl Form {
    /// Parses a `<form>` element found on the page at `page_url`
    pub(crate) fn from_element(element: ElementRef<'_>, page_url: &Url) -> Self {
        let attrs = element.value();

        // An absent or empty action posts back to the page itself
        let action = attrs
            .attr("action")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .and_then(|a| page_url.join(a).ok())
            .unwrap_or_else(|| page_url.clone());

        let mut fields = Vec::new();
        let mut buttons = Vec::new();

        if let Ok(control_selector) = Selector::parse("input, select, textarea, button") {
            for control in element.select(&control_selector) {
                collect_control(control, &mut fields, &mut buttons);
            }
        }

        Self {
            name: attrs.attr("name").map(str::to_string),
            id: attrs.attr("id").map(str::to_string),
            method: Method::from_attr(attrs.attr("method")),
            action,
            page_url: page_url.clone(),
            fields,
            buttons,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Absolute URL the form submits to
    pub fn action(&self) -> &Url {
        &self.action
    }

    /// Page the form was found on, sent as the Referer on submit
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Returns the value of the first field called `name`
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Sets the value of the first non-toggle field called `name`
    ///
    /// Fails when the form has no such field; a missing field means the page
    /// is not the one we expected.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let label = self.label();
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name && !matches!(f.kind, FieldKind::Radio | FieldKind::Checkbox))
            .ok_or_else(|| {
                SubwayError::Navigation(format!("Form '{}' has no field named '{}'", label, name))
            })?;
        field.value = value.into();
        Ok(())
    }

    /// All radio buttons in document order
    pub fn radio_buttons(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Radio)
    }

    /// Checks the `index`-th radio button and clears the rest of its group
    pub fn check_radio(&mut self, index: usize) -> Result<()> {
        let label = self.label();
        let position = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind == FieldKind::Radio)
            .nth(index)
            .map(|(i, _)| i)
            .ok_or_else(|| {
                SubwayError::Navigation(format!(
                    "Form '{}' has no radio button at index {}",
                    label, index
                ))
            })?;

        let group = self.fields[position].name.clone();
        for (i, field) in self.fields.iter_mut().enumerate() {
            if field.kind == FieldKind::Radio && field.name == group {
                field.checked = i == position;
            }
        }
        Ok(())
    }

    /// Name/value pairs a browser would send when `button` is clicked
    ///
    /// Unchecked radios and checkboxes are left out, as are all buttons other
    /// than the one clicked.
    pub fn submission(&self, button: Option<&Button>) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .fields
            .iter()
            .filter(|f| f.is_successful())
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();

        if let Some(Button {
            name: Some(name),
            value,
            kind,
        }) = button
        {
            if *kind == ButtonKind::Image {
                pairs.push((format!("{}.x", name), "0".to_string()));
                pairs.push((format!("{}.y", name), "0".to_string()));
            } else {
                pairs.push((name.clone(), value.clone()));
            }
        }

        pairs
    }

    /// Human-readable identifier used in error messages
    fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| self.action.to_string())
    }
}

fn collect_control(control: ElementRef<'_>, fields: &mut Vec<Field>, buttons: &mut Vec<Button>) {
    let attrs = control.value();
    let name = attrs.attr("name").filter(|n| !n.is_empty());

    match attrs.name() {
        "button" => {
            let kind = match attrs.attr("type").map(str::to_ascii_lowercase).as_deref() {
                Some("button") | Some("reset") => ButtonKind::Button,
                _ => ButtonKind::Submit,
            };
            buttons.push(Button {
                name: name.map(str::to_string),
                value: attrs.attr("value").unwrap_or_default().to_string(),
                kind,
            });
        }
        "select" => {
            let Some(name) = name else { return };
            fields.push(Field {
                name: name.to_string(),
                value: selected_option(control).unwrap_or_default(),
                kind: FieldKind::Select,
                checked: false,
            });
        }
        "textarea" => {
            let Some(name) = name else { return };
            fields.push(Field {
                name: name.to_string(),
                value: control.text().collect(),
                kind: FieldKind::Textarea,
                checked: false,
            });
        }
        _ => {
            let input_type = attrs.attr("type").unwrap_or("text").to_ascii_lowercase();
            let value = attrs.attr("value").unwrap_or_default().to_string();

            let kind = match input_type.as_str() {
                "submit" | "image" | "button" | "reset" => {
                    let kind = match input_type.as_str() {
                        "submit" => ButtonKind::Submit,
                        "image" => ButtonKind::Image,
                        _ => ButtonKind::Button,
                    };
                    buttons.push(Button {
                        name: name.map(str::to_string),
                        value,
                        kind,
                    });
                    return;
                }
                "hidden" => FieldKind::Hidden,
                "password" => FieldKind::Password,
                "radio" => FieldKind::Radio,
                "checkbox" => FieldKind::Checkbox,
                _ => FieldKind::Text,
            };

            let Some(name) = name else { return };
            fields.push(Field {
                name: name.to_string(),
                value: if kind == FieldKind::Checkbox && value.is_empty() {
                    "on".to_string()
                } else {
                    value
                },
                checked: attrs.attr("checked").is_some(),
                kind,
            });
        }
    }
}

/// Value of the selected `<option>`, falling back to the first one
fn selected_option(select: ElementRef<'_>) -> Option<String> {
    let option_selector = Selector::parse("option").ok()?;
    let options: Vec<ElementRef<'_>> = select.select(&option_selector).collect();

    let chosen = options
        .iter()
        .find(|o| o.value().attr("selected").is_some())
        .or_else(|| options.first())?;

    Some(
        chosen
            .value()
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| chosen.text().collect::<String>().trim().to_string()),
    )
}
