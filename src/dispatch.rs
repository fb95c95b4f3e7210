use crate::components::Component;
use crate::templates::{FormatTemplate, Template};
use crate::{Error, LIB_LOG_TARGET};
use serde_json::Value;
use tracing::debug;

/// A [`Component`] paired with the [`FormatTemplate`] that fills its message fields.
#[derive(Debug, Clone)]
pub struct Dispatch {
    component: Box<dyn Component>,
    template: FormatTemplate,
}

impl Dispatch {
    /// Create a new `Dispatch`.
    pub fn new(component: Box<dyn Component>, template: FormatTemplate) -> Self {
        Self { component, template }
    }

    /// Return the component messages are sent with.
    pub fn component(&self) -> &dyn Component {
        &*self.component
    }

    /// Return the template used to render message fields.
    pub fn template(&self) -> &FormatTemplate {
        &self.template
    }

    /// Render the template with `args` and send the result through the component.
    pub async fn send(&self, args: &Value) -> Result<(), Error> {
        let fields = self.template.render(args)?;
        debug!(target: LIB_LOG_TARGET, "Dispatching {} rendered fields to {}", fields.len(), self.component.name());
        self.component.send_fields(&fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Fields;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<Fields>>>,
    }

    #[async_trait]
    impl Component for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn send_fields(&self, fields: &Fields) -> Result<(), Error> {
            self.sent.lock().unwrap().push(fields.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn renders_then_sends() {
        let recorder = Recorder::default();
        let dispatch = Dispatch::new(Box::new(recorder.clone()), FormatTemplate::from([("body", "Hello {name}")]));

        dispatch.send(&json!({"name": "World"})).await.unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["body"], "Hello World");
    }

    #[tokio::test]
    async fn render_failure_sends_nothing() {
        let recorder = Recorder::default();
        let dispatch = Dispatch::new(Box::new(recorder.clone()), FormatTemplate::from([("body", "Hello {name}")]));

        let result = dispatch.send(&json!({})).await;

        assert!(matches!(result, Err(Error::Template(_))));
        assert!(recorder.sent.lock().unwrap().is_empty());
    }
}
