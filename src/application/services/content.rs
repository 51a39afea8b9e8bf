use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    models::{MediaItem, Template, MAX_TEXT_CHARS},
    repositories::TemplateStore,
};

#[derive(Debug, Clone, Default)]
pub struct ContentRequest {
    pub text: Option<String>,
    pub media: Vec<MediaItem>,
    pub template_id: Option<Uuid>,
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedContent {
    pub text: String,
    pub media: Vec<MediaItem>,
    pub template_id: Option<Uuid>,
}

/// Turns a send request (raw content or template reference + variables) into
/// final message content, ready for compliance evaluation and dispatch.
pub struct ContentResolver {
    templates: Arc<dyn TemplateStore>,
}

impl ContentResolver {
    pub fn new(templates: Arc<dyn TemplateStore>) -> Self {
        Self { templates }
    }

    pub async fn resolve(
        &self,
        tenant_id: Uuid,
        request: &ContentRequest,
    ) -> Result<ResolvedContent, DomainError> {
        let text = match request.template_id {
            None => request.text.clone().unwrap_or_default(),
            Some(template_id) => {
                let template = self
                    .templates
                    .get(template_id, tenant_id)
                    .await?
                    .ok_or(DomainError::TemplateNotFound(template_id))?;

                validate_variables(&template, &request.variables)?;
                render(&template, &request.variables)
            }
        };

        let length = text.chars().count();
        if length > MAX_TEXT_CHARS {
            return Err(DomainError::ContentTooLong {
                length,
                limit: MAX_TEXT_CHARS,
            });
        }

        // Usage bookkeeping happens only once the whole resolution succeeded,
        // never on a validation failure, including an overlong render.
        if let Some(template_id) = request.template_id {
            self.templates.record_usage(template_id).await?;
        }

        Ok(ResolvedContent {
            text,
            media: request.media.clone(),
            template_id: request.template_id,
        })
    }
}

/// Every required variable must carry a non-empty supplied or default value.
/// Reports all missing names at once, not just the first.
fn validate_variables(
    template: &Template,
    supplied: &HashMap<String, String>,
) -> Result<(), DomainError> {
    let missing: Vec<String> = template
        .variables
        .iter()
        .filter(|variable| variable.required)
        .filter(|variable| {
            let has_supplied = supplied
                .get(&variable.name)
                .is_some_and(|value| !value.trim().is_empty());
            let has_default = variable
                .default_value
                .as_deref()
                .is_some_and(|value| !value.trim().is_empty());
            !has_supplied && !has_default
        })
        .map(|variable| variable.name.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::MissingRequiredVariables(missing))
    }
}

/// Substitutes `{{name}}` for each declared variable: supplied value first,
/// declared default second, literal placeholder otherwise. Placeholders not
/// declared as variables stay untouched.
fn render(template: &Template, supplied: &HashMap<String, String>) -> String {
    let mut text = template.body.clone();
    for variable in &template.variables {
        let placeholder = format!("{{{{{}}}}}", variable.name);
        let value = supplied
            .get(&variable.name)
            .cloned()
            .or_else(|| variable.default_value.clone());
        if let Some(value) = value {
            text = text.replace(&placeholder, &value);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use super::*;
    use crate::domain::models::TemplateVariable;

    struct FakeTemplateStore {
        templates: RwLock<HashMap<Uuid, Template>>,
        usage_calls: AtomicU32,
    }

    impl FakeTemplateStore {
        fn with(template: Template) -> Arc<Self> {
            let mut map = HashMap::new();
            map.insert(template.id, template);
            Arc::new(Self {
                templates: RwLock::new(map),
                usage_calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TemplateStore for FakeTemplateStore {
        async fn get(
            &self,
            template_id: Uuid,
            tenant_id: Uuid,
        ) -> anyhow::Result<Option<Template>> {
            let templates = self.templates.read().await;
            Ok(templates
                .get(&template_id)
                .filter(|t| t.tenant_id == tenant_id)
                .cloned())
        }

        async fn record_usage(&self, _template_id: Uuid) -> anyhow::Result<()> {
            self.usage_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sample_template(tenant_id: Uuid) -> Template {
        Template {
            id: Uuid::new_v4(),
            tenant_id,
            name: "promo".to_string(),
            body: "Hi {{name}}, your order of {{item}} ships {{when}}. {{untouched}}".to_string(),
            variables: vec![
                TemplateVariable {
                    name: "name".to_string(),
                    required: true,
                    default_value: None,
                },
                TemplateVariable {
                    name: "item".to_string(),
                    required: true,
                    default_value: None,
                },
                TemplateVariable {
                    name: "when".to_string(),
                    required: false,
                    default_value: Some("soon".to_string()),
                },
            ],
            times_used: 0,
            last_used_at: None,
        }
    }

    #[tokio::test]
    async fn passthrough_rejects_overlong_text() {
        let tenant_id = Uuid::new_v4();
        let store = FakeTemplateStore::with(sample_template(tenant_id));
        let resolver = ContentResolver::new(store);

        let request = ContentRequest {
            text: Some("x".repeat(1601)),
            ..Default::default()
        };
        let err = resolver.resolve(tenant_id, &request).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ContentTooLong { length: 1601, limit: 1600 }
        ));
    }

    #[tokio::test]
    async fn renders_with_defaults_and_leaves_unknown_placeholders() {
        let tenant_id = Uuid::new_v4();
        let template = sample_template(tenant_id);
        let template_id = template.id;
        let store = FakeTemplateStore::with(template);
        let resolver = ContentResolver::new(store.clone());

        let mut variables = HashMap::new();
        variables.insert("name".to_string(), "Ana".to_string());
        variables.insert("item".to_string(), "wine".to_string());
        let request = ContentRequest {
            template_id: Some(template_id),
            variables,
            ..Default::default()
        };

        let resolved = resolver.resolve(tenant_id, &request).await.unwrap();
        assert_eq!(
            resolved.text,
            "Hi Ana, your order of wine ships soon. {{untouched}}"
        );
        assert_eq!(store.usage_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn overlong_render_fails_and_usage_untouched() {
        let tenant_id = Uuid::new_v4();
        let mut template = sample_template(tenant_id);
        template.body = format!("Hi {{{{name}}}}, {}", "x".repeat(1601));
        let template_id = template.id;
        let store = FakeTemplateStore::with(template);
        let resolver = ContentResolver::new(store.clone());

        let mut variables = HashMap::new();
        variables.insert("name".to_string(), "Ana".to_string());
        variables.insert("item".to_string(), "wine".to_string());
        let request = ContentRequest {
            template_id: Some(template_id),
            variables,
            ..Default::default()
        };

        let err = resolver.resolve(tenant_id, &request).await.unwrap_err();
        assert!(matches!(err, DomainError::ContentTooLong { .. }));
        assert_eq!(store.usage_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_variables_are_all_reported_and_usage_untouched() {
        let tenant_id = Uuid::new_v4();
        let template = sample_template(tenant_id);
        let template_id = template.id;
        let store = FakeTemplateStore::with(template);
        let resolver = ContentResolver::new(store.clone());

        let request = ContentRequest {
            template_id: Some(template_id),
            ..Default::default()
        };
        let err = resolver.resolve(tenant_id, &request).await.unwrap_err();
        match err {
            DomainError::MissingRequiredVariables(names) => {
                assert_eq!(names, vec!["name".to_string(), "item".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.usage_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn foreign_tenant_template_is_not_found() {
        let tenant_id = Uuid::new_v4();
        let template = sample_template(tenant_id);
        let template_id = template.id;
        let store = FakeTemplateStore::with(template);
        let resolver = ContentResolver::new(store);

        let request = ContentRequest {
            template_id: Some(template_id),
            ..Default::default()
        };
        let err = resolver
            .resolve(Uuid::new_v4(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TemplateNotFound(id) if id == template_id));
    }
}
