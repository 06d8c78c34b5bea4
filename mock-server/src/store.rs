//! In-memory placeholders and templates.
//!
//! Every mutation stamps `lastModificationDate`. Views are rendered as JSON
//! in the camelCase shape the real API uses; summaries leave out `rawData`
//! and `usedPlaceholders`, which only single-resource fetches carry.

use std::collections::HashMap;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::envelope::Failure;

#[derive(Debug, Clone)]
pub struct StoredPlaceholder {
    pub id: String,
    pub name: String,
    pub data: String,
    pub last_modification_date: String,
}

#[derive(Debug, Clone)]
pub struct StoredTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub placeholder_ids: Vec<String>,
    pub last_modification_date: String,
}

#[derive(Debug, Default)]
pub struct Store {
    placeholders: HashMap<String, StoredPlaceholder>,
    templates: HashMap<String, StoredTemplate>,
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn now() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl Store {
    fn placeholder(&self, id: &str) -> Result<&StoredPlaceholder, Failure> {
        self.placeholders
            .get(id)
            .ok_or_else(|| Failure::not_found("placeholder"))
    }

    fn template(&self, id: &str) -> Result<&StoredTemplate, Failure> {
        self.templates.get(id).ok_or_else(|| Failure::not_found("template"))
    }

    fn check_placeholder_ids(&self, ids: &[String]) -> Result<(), Failure> {
        match ids.iter().find(|id| !self.placeholders.contains_key(id.as_str())) {
            Some(id) => Err(Failure::bad_request(format!("Unknown placeholder `{id}`."))),
            None => Ok(()),
        }
    }

    fn references(&self, placeholder_id: &str) -> u64 {
        self.templates
            .values()
            .filter(|t| t.placeholder_ids.iter().any(|id| id == placeholder_id))
            .count() as u64
    }

    // -- views --

    fn placeholder_summary(&self, p: &StoredPlaceholder) -> Value {
        json!({
            "id": p.id,
            "name": p.name,
            "lastModificationDate": p.last_modification_date,
            "numberOfReferencedTemplates": self.references(&p.id),
        })
    }

    fn template_summary(t: &StoredTemplate) -> Value {
        json!({
            "id": t.id,
            "name": t.name,
            "lastModificationDate": t.last_modification_date,
            "description": t.description,
        })
    }

    fn sorted_placeholders<'a>(&self, it: impl Iterator<Item = &'a StoredPlaceholder>) -> Vec<Value> {
        let mut list: Vec<&StoredPlaceholder> = it.collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list.into_iter().map(|p| self.placeholder_summary(p)).collect()
    }

    fn sorted_templates<'a>(it: impl Iterator<Item = &'a StoredTemplate>) -> Vec<Value> {
        let mut list: Vec<&StoredTemplate> = it.collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list.into_iter().map(Self::template_summary).collect()
    }

    // -- placeholders --

    pub fn list_placeholders(&self) -> Vec<Value> {
        self.sorted_placeholders(self.placeholders.values())
    }

    pub fn placeholder_detail(&self, id: &str) -> Result<Value, Failure> {
        let p = self.placeholder(id)?;
        let mut view = self.placeholder_summary(p);
        view["rawData"] = Value::String(p.data.clone());
        Ok(view)
    }

    pub fn create_placeholder(&mut self, name: String, data: String) -> String {
        let id = new_id();
        let placeholder = StoredPlaceholder {
            id: id.clone(),
            name,
            data,
            last_modification_date: now(),
        };
        self.placeholders.insert(id.clone(), placeholder);
        id
    }

    pub fn update_placeholder(&mut self, id: &str, name: Option<String>, data: Option<String>) -> Result<(), Failure> {
        let p = self
            .placeholders
            .get_mut(id)
            .ok_or_else(|| Failure::not_found("placeholder"))?;
        if let Some(name) = name {
            p.name = name;
        }
        if let Some(data) = data {
            p.data = data;
        }
        p.last_modification_date = now();
        Ok(())
    }

    pub fn copy_placeholder(&mut self, id: &str, name: Option<String>) -> Result<String, Failure> {
        let source = self.placeholder(id)?;
        let name = name.unwrap_or_else(|| source.name.clone());
        let data = source.data.clone();
        Ok(self.create_placeholder(name, data))
    }

    /// A placeholder still used by a template cannot be deleted.
    pub fn delete_placeholder(&mut self, id: &str) -> Result<(), Failure> {
        self.placeholder(id)?;
        if self.references(id) > 0 {
            return Err(Failure::new(
                StatusCode::CONFLICT,
                "Placeholder is still used by at least one template.",
            ));
        }
        self.placeholders.remove(id);
        Ok(())
    }

    pub fn templates_using(&self, placeholder_id: &str) -> Result<Vec<Value>, Failure> {
        self.placeholder(placeholder_id)?;
        Ok(Self::sorted_templates(
            self.templates
                .values()
                .filter(|t| t.placeholder_ids.iter().any(|id| id == placeholder_id)),
        ))
    }

    // -- templates --

    pub fn list_templates(&self) -> Vec<Value> {
        Self::sorted_templates(self.templates.values())
    }

    pub fn template_detail(&self, id: &str) -> Result<Value, Failure> {
        let t = self.template(id)?;
        let mut view = Self::template_summary(t);
        view["usedPlaceholders"] = json!(t.placeholder_ids);
        Ok(view)
    }

    pub fn create_template(
        &mut self,
        name: String,
        description: String,
        placeholder_ids: Vec<String>,
    ) -> Result<String, Failure> {
        self.check_placeholder_ids(&placeholder_ids)?;
        let id = new_id();
        let template = StoredTemplate {
            id: id.clone(),
            name,
            description,
            placeholder_ids,
            last_modification_date: now(),
        };
        self.templates.insert(id.clone(), template);
        Ok(id)
    }

    pub fn update_template(
        &mut self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
        placeholder_ids: Option<Vec<String>>,
    ) -> Result<(), Failure> {
        self.template(id)?;
        if let Some(ids) = &placeholder_ids {
            self.check_placeholder_ids(ids)?;
        }
        let t = self
            .templates
            .get_mut(id)
            .ok_or_else(|| Failure::not_found("template"))?;
        if let Some(name) = name {
            t.name = name;
        }
        if let Some(description) = description {
            t.description = description;
        }
        if let Some(ids) = placeholder_ids {
            t.placeholder_ids = ids;
        }
        t.last_modification_date = now();
        Ok(())
    }

    pub fn copy_template(
        &mut self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<String, Failure> {
        let source = self.template(id)?;
        let name = name.unwrap_or_else(|| source.name.clone());
        let description = description.unwrap_or_else(|| source.description.clone());
        let placeholder_ids = source.placeholder_ids.clone();
        self.create_template(name, description, placeholder_ids)
    }

    pub fn delete_template(&mut self, id: &str) -> Result<(), Failure> {
        self.templates
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Failure::not_found("template"))
    }

    pub fn placeholders_of(&self, template_id: &str) -> Result<Vec<Value>, Failure> {
        let t = self.template(template_id)?;
        Ok(self.sorted_placeholders(
            t.placeholder_ids
                .iter()
                .filter_map(|id| self.placeholders.get(id)),
        ))
    }

    /// A stand-in PDF naming the template and the data it was given.
    pub fn render(&self, template_id: &str, data: &Value, language: &str) -> Result<Vec<u8>, Failure> {
        let t = self.template(template_id)?;
        let pdf = format!(
            "%PDF-1.4\n% {name} [{language}]\n% {data}\n%%EOF\n",
            name = t.name,
        );
        Ok(pdf.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_simple_uuids() {
        let mut store = Store::default();
        let id = store.create_placeholder("p".into(), "{}".into());
        assert_eq!(id.len(), 32);
        assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn reference_count_follows_templates() {
        let mut store = Store::default();
        let p = store.create_placeholder("p".into(), "{}".into());
        assert_eq!(store.placeholder_detail(&p).unwrap()["numberOfReferencedTemplates"], 0);

        let t = store.create_template("t".into(), String::new(), vec![p.clone()]).unwrap();
        assert_eq!(store.placeholder_detail(&p).unwrap()["numberOfReferencedTemplates"], 1);

        let err = store.delete_placeholder(&p).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        store.delete_template(&t).unwrap();
        store.delete_placeholder(&p).unwrap();
        assert!(store.list_placeholders().is_empty());
    }

    #[test]
    fn create_template_rejects_unknown_placeholder() {
        let mut store = Store::default();
        let err = store
            .create_template("t".into(), String::new(), vec!["nope".into()])
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn copies_keep_content_and_take_new_names() {
        let mut store = Store::default();
        let p = store.create_placeholder("orig".into(), r#"{"a":1}"#.into());
        let copy = store.copy_placeholder(&p, Some("copy".into())).unwrap();
        let view = store.placeholder_detail(&copy).unwrap();
        assert_eq!(view["name"], "copy");
        assert_eq!(view["rawData"], r#"{"a":1}"#);

        let same_name = store.copy_placeholder(&p, None).unwrap();
        assert_eq!(store.placeholder_detail(&same_name).unwrap()["name"], "orig");
    }

    #[test]
    fn summaries_omit_detail_fields() {
        let mut store = Store::default();
        let p = store.create_placeholder("p".into(), "{}".into());
        store.create_template("t".into(), "d".into(), vec![p]).unwrap();
        let templates = store.list_templates();
        assert!(templates[0].get("usedPlaceholders").is_none());
        assert!(store.list_placeholders()[0].get("rawData").is_none());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = Store::default();
        assert_eq!(store.template_detail("x").unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(store.delete_template("x").unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(
            store.update_placeholder("x", None, None).unwrap_err().status,
            StatusCode::NOT_FOUND
        );
    }
}
