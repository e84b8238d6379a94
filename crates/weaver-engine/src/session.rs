//! Editing session: the working code bundle, its prompt and the project it
//! came from.
//!
//! One method per user action. Every outcome, success or failure, is also
//! reported to the session's [`NotificationSink`].
//!
//! Model calls are split in three so a caller can keep the session available
//! while a request is outstanding: [`Session::begin_generate`] /
//! [`Session::begin_edit`] validate and mark the session busy,
//! [`Invocation::run`] awaits the model, and [`Session::finish`] applies the
//! reply. [`Session::generate`] and [`Session::edit`] do all three.

use std::path::Path;
use std::sync::Arc;

use crate::bundle::{CodeBundle, ComponentCode, MultiFileCode, Section, Variant};
use crate::constants::names;
use crate::error::{Result, WeaverError};
use crate::events::{Notification, NotificationSink};
use crate::flows::{
    CodeModel, EditCodeOutput, EditCodeRequest, EditComponentOutput, EditComponentRequest,
    FlowError, GenerateCodeOutput, GenerateComponentOutput, GenerateRequest,
};
use crate::parser;
use crate::prompt;
use crate::store::{Project, ProjectStore, StoreError};

/// Asks the user for a snapshot name.
///
/// Returns `None` when the user cancels.
pub trait NamePrompt {
    fn ask(&mut self, message: &str, default: &str) -> Option<String>;
}

/// The bundle and prompt of the last successful generate or edit
#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckpointBasis {
    code: CodeBundle,
    prompt: String,
}

/// A model request prepared by `begin_*`
#[derive(Debug, Clone)]
pub enum ModelRequest {
    GenerateCode(GenerateRequest),
    GenerateComponent(GenerateRequest),
    EditCode(EditCodeRequest),
    EditComponent(EditComponentRequest),
}

/// The model's answer to a [`ModelRequest`]
#[derive(Debug, Clone)]
pub enum ModelReply {
    GeneratedCode(GenerateCodeOutput),
    GeneratedComponent(GenerateComponentOutput),
    EditedCode(EditCodeOutput),
    EditedComponent(EditComponentOutput),
}

/// An outstanding model call
#[derive(Debug, Clone)]
pub struct Invocation {
    request: ModelRequest,
    /// The user's prompt as typed, recorded with the result
    prompt: String,
}

impl Invocation {
    pub fn request(&self) -> &ModelRequest {
        &self.request
    }

    fn is_edit(&self) -> bool {
        matches!(
            self.request,
            ModelRequest::EditCode(_) | ModelRequest::EditComponent(_)
        )
    }

    /// Send the request to the model
    pub async fn run(&self, model: &dyn CodeModel) -> std::result::Result<ModelReply, FlowError> {
        Ok(match &self.request {
            ModelRequest::GenerateCode(req) => {
                ModelReply::GeneratedCode(model.generate_code(req).await?)
            }
            ModelRequest::GenerateComponent(req) => {
                ModelReply::GeneratedComponent(model.generate_component(req).await?)
            }
            ModelRequest::EditCode(req) => ModelReply::EditedCode(model.edit_code(req).await?),
            ModelRequest::EditComponent(req) => {
                ModelReply::EditedComponent(model.edit_component(req).await?)
            }
        })
    }
}

/// Working state of one editing session
pub struct Session {
    variant: Variant,
    code: CodeBundle,
    prompt: String,
    current_project_id: Option<String>,
    checkpoint: Option<CheckpointBasis>,
    in_flight: bool,
    store: ProjectStore,
    sink: Arc<dyn NotificationSink>,
}

impl Session {
    pub fn new(variant: Variant, store: ProjectStore, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            variant,
            code: CodeBundle::empty(variant),
            prompt: String::new(),
            current_project_id: None,
            checkpoint: None,
            in_flight: false,
            store,
            sink,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn code(&self) -> &CodeBundle {
        &self.code
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn current_project_id(&self) -> Option<&str> {
        self.current_project_id.as_deref()
    }

    /// The associated project, if it is still in the store
    pub fn current_project(&self) -> Option<&Project> {
        self.current_project_id
            .as_deref()
            .and_then(|id| self.store.get(id))
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// True while the displayed code is exactly the last AI result
    pub fn can_create_checkpoint(&self) -> bool {
        self.checkpoint
            .as_ref()
            .is_some_and(|basis| basis.code == self.code)
    }

    // =========================================================================
    // Notification helpers
    // =========================================================================

    fn info(&self, title: &str, description: impl Into<String>) {
        self.sink.notify(Notification::info(title, description));
    }

    fn fail<T>(&self, title: &str, err: WeaverError) -> Result<T> {
        self.sink.notify(Notification::error(title, err.to_string()));
        Err(err)
    }

    /// Report the outcome of a store write that already changed memory
    fn persisted<T>(
        &self,
        result: std::result::Result<(), StoreError>,
        title: &str,
        description: String,
        value: T,
    ) -> Result<T> {
        match result {
            Ok(()) => {
                self.info(title, description);
                Ok(value)
            }
            Err(e) => {
                log::error!("{}", e);
                self.fail("Error Saving Project", WeaverError::Store(e))
            }
        }
    }

    /// Load the persisted projects into the store
    pub fn load_projects(&mut self) -> Result<usize> {
        match self.store.load() {
            Ok(count) => Ok(count),
            Err(e) => self.fail("Error loading projects", WeaverError::Store(e)),
        }
    }

    // =========================================================================
    // Prompt and manual edits
    // =========================================================================

    /// Replace the prompt text
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Replace one section of the bundle
    pub fn set_section(&mut self, section: Section, content: impl Into<String>) -> Result<()> {
        let variant = self.variant;
        match self.code.section_mut(section) {
            Some(slot) => {
                *slot = content.into();
                Ok(())
            }
            None => self.fail(
                "Invalid Section",
                WeaverError::invalid(format!(
                    "{} is not part of {} code",
                    section.label(),
                    variant
                )),
            ),
        }
    }

    /// Read a file from disk into one section
    pub fn upload_section(&mut self, section: Section, path: &Path) -> Result<()> {
        let title = format!("{} File Upload Failed", section.label());

        if !self.variant.sections().contains(&section) {
            let err = WeaverError::invalid(format!(
                "{} is not part of {} code",
                section.label(),
                self.variant
            ));
            return self.fail(&title, err);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !section.accepted_extensions().contains(&extension.as_str()) {
            let err = WeaverError::invalid(format!(
                "{} files must end in .{}",
                section.label(),
                section.accepted_extensions().join(", .")
            ));
            return self.fail(&title, err);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return self.fail(&title, WeaverError::Io(e)),
        };
        self.set_section(section, content)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.info(
            &format!("{} File Uploaded", section.label()),
            format!("{} loaded into {} editor.", file_name, section.label()),
        );
        Ok(())
    }

    /// Empty the bundle and prompt and forget the associated project
    pub fn clear(&mut self) {
        self.reset();
        self.info("Code Cleared", "All code has been cleared.");
    }

    fn reset(&mut self) {
        self.code = CodeBundle::empty(self.variant);
        self.prompt.clear();
        self.current_project_id = None;
        self.checkpoint = None;
    }

    // =========================================================================
    // Model round-trips
    // =========================================================================

    fn ensure_idle(&self) -> Result<()> {
        if self.in_flight {
            return self.fail("Request In Progress", WeaverError::Busy);
        }
        Ok(())
    }

    /// Validate and prepare a generation request; marks the session busy
    pub fn begin_generate(&mut self) -> Result<Invocation> {
        self.ensure_idle()?;
        if self.prompt.trim().is_empty() {
            return self.fail(
                "Prompt is empty",
                WeaverError::invalid("Please enter a prompt to generate code."),
            );
        }

        let request = GenerateRequest::new(self.prompt.clone());
        let request = match self.variant {
            Variant::MultiFile => ModelRequest::GenerateCode(request),
            Variant::Component => ModelRequest::GenerateComponent(request),
        };
        self.in_flight = true;
        Ok(Invocation {
            request,
            prompt: self.prompt.clone(),
        })
    }

    /// Validate and prepare an edit request; marks the session busy
    pub fn begin_edit(&mut self) -> Result<Invocation> {
        self.ensure_idle()?;
        if self.prompt.trim().is_empty() {
            return self.fail(
                "Prompt is empty",
                WeaverError::invalid("Please enter a prompt to edit the code."),
            );
        }
        if !self.code.has_code() {
            return self.fail(
                "No Code to Edit",
                WeaverError::invalid("Generate some code first before editing."),
            );
        }

        let request = match &self.code {
            CodeBundle::MultiFile(code) => ModelRequest::EditCode(EditCodeRequest {
                existing_code: prompt::serialize_existing_code(code),
                prompt: prompt::edit_instruction(&self.prompt),
            }),
            CodeBundle::Component(code) => ModelRequest::EditComponent(EditComponentRequest {
                existing_component: code.component.clone(),
                existing_css: code.css.clone(),
                prompt: self.prompt.clone(),
            }),
        };
        self.in_flight = true;
        Ok(Invocation {
            request,
            prompt: self.prompt.clone(),
        })
    }

    /// Clear the busy mark and apply the model's reply
    pub fn finish(
        &mut self,
        invocation: Invocation,
        reply: std::result::Result<ModelReply, FlowError>,
    ) -> Result<()> {
        self.in_flight = false;

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                let title = if invocation.is_edit() {
                    "Error Editing Code"
                } else {
                    "Error Generating Code"
                };
                return self.fail(title, WeaverError::Model(e));
            }
        };

        let code: CodeBundle = match reply {
            ModelReply::GeneratedCode(out) => {
                MultiFileCode::new(out.html, out.css, out.javascript).into()
            }
            ModelReply::GeneratedComponent(out) => {
                ComponentCode::new(out.react_component, out.css).into()
            }
            ModelReply::EditedCode(out) => match parser::parse_edit_response(&out.modified_code) {
                Ok(code) => code.into(),
                Err(e) => {
                    self.sink.notify(Notification::error(
                        "Parsing Error",
                        "AI response format was not as expected. Try rephrasing your edit.",
                    ));
                    return Err(e.into());
                }
            },
            ModelReply::EditedComponent(out) => {
                ComponentCode::new(out.modified_component, out.modified_css).into()
            }
        };

        if code.variant() != self.variant {
            return self.fail(
                "Unexpected Response",
                WeaverError::VariantMismatch {
                    expected: self.variant,
                    found: code.variant(),
                },
            );
        }

        let is_edit = invocation.is_edit();
        self.code = code;
        self.checkpoint = Some(CheckpointBasis {
            code: self.code.clone(),
            prompt: invocation.prompt,
        });

        if is_edit {
            self.info("Code Edited", "AI has rewoven your web!");
        } else {
            self.current_project_id = None;
            self.info("Code Generated", "AI has woven your web!");
        }
        Ok(())
    }

    /// Generate a fresh bundle from the prompt
    pub async fn generate(&mut self, model: &dyn CodeModel) -> Result<()> {
        let invocation = self.begin_generate()?;
        let reply = invocation.run(model).await;
        self.finish(invocation, reply)
    }

    /// Rewrite the current bundle according to the prompt
    pub async fn edit(&mut self, model: &dyn CodeModel) -> Result<()> {
        let invocation = self.begin_edit()?;
        let reply = invocation.run(model).await;
        self.finish(invocation, reply)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Ask for a name; `Ok(None)` on cancel, validation error when blank
    fn ask_name(
        &self,
        prompter: &mut dyn NamePrompt,
        message: &str,
        default: &str,
        what: &str,
    ) -> Result<Option<String>> {
        let Some(name) = prompter.ask(message, default) else {
            return Ok(None);
        };
        let name = name.trim();
        if name.is_empty() {
            return self.fail(
                "Invalid Name",
                WeaverError::invalid(format!("{what} name cannot be empty.")),
            );
        }
        Ok(Some(name.to_string()))
    }

    /// Store a new snapshot of the current bundle and associate it
    fn save_new(&mut self, name: String, title: &str, verb: &str) -> Result<Option<Project>> {
        let project = self
            .store
            .new_project(&name, self.code.clone(), &self.prompt);
        let result = self.store.insert(project.clone());
        self.current_project_id = Some(project.id.clone());
        self.checkpoint = None;

        let description = format!("\"{}\" has been {}.", project.name, verb);
        self.persisted(result, title, description, Some(project))
    }

    /// Overwrite the associated project, or save as a new one when there is
    /// none. Returns `Ok(None)` if the user cancels naming.
    pub fn save(&mut self, prompter: &mut dyn NamePrompt) -> Result<Option<Project>> {
        if let Some(current) = self.current_project().cloned() {
            let result = self
                .store
                .update(&current.id, self.code.clone(), &self.prompt)
                .map(|_| ());
            self.checkpoint = None;

            let updated = self.store.get(&current.id).cloned();
            let description = format!("\"{}\" has been updated.", current.name);
            return self.persisted(result, "Project Updated", description, updated);
        }

        let Some(name) = self.ask_name(
            prompter,
            "Enter a name for your new project:",
            names::UNTITLED,
            "Project",
        )?
        else {
            return Ok(None);
        };
        self.save_new(name, "Project Saved", "saved")
    }

    /// Always store a new snapshot and associate it
    pub fn save_as_copy(&mut self, prompter: &mut dyn NamePrompt) -> Result<Option<Project>> {
        let suggested = match self.current_project() {
            Some(project) => format!("{}{}", names::COPY_PREFIX, project.name),
            None => names::UNTITLED.to_string(),
        };

        let Some(name) = self.ask_name(
            prompter,
            "Enter a name for the new project copy:",
            &suggested,
            "Project",
        )?
        else {
            return Ok(None);
        };
        self.save_new(name, "Project Saved As Copy", "created")
    }

    /// Store the last AI result as a standalone snapshot without changing
    /// the association
    pub fn save_checkpoint(&mut self, prompter: &mut dyn NamePrompt) -> Result<Option<Project>> {
        if !self.can_create_checkpoint() {
            return self.fail(
                "Checkpoint Unavailable",
                WeaverError::invalid(
                    "Checkpoints capture the latest AI result; generate or edit code first.",
                ),
            );
        }
        let basis_prompt = self
            .checkpoint
            .as_ref()
            .map(|basis| basis.prompt.clone())
            .unwrap_or_default();

        let base = self
            .current_project()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| names::UNTITLED.to_string());
        let default = format!(
            "{} - Checkpoint {}",
            base,
            chrono::Local::now().format("%H:%M:%S")
        );

        let Some(name) = self.ask_name(
            prompter,
            "Enter a name for this checkpoint:",
            &default,
            "Checkpoint",
        )?
        else {
            return Ok(None);
        };

        let project = self
            .store
            .new_project(&name, self.code.clone(), &basis_prompt);
        let result = self.store.insert(project.clone());
        self.checkpoint = None;

        let description = format!("\"{}\" has been saved.", project.name);
        self.persisted(result, "Checkpoint Saved", description, Some(project))
    }

    /// Restore a snapshot into the session
    pub fn load_project(&mut self, id: &str) -> Result<()> {
        let Some(project) = self.store.get(id).cloned() else {
            return self.fail("Project Not Found", WeaverError::NotFound(id.to_string()));
        };
        if project.code.variant() != self.variant {
            return self.fail(
                "Cannot Load Project",
                WeaverError::VariantMismatch {
                    expected: self.variant,
                    found: project.code.variant(),
                },
            );
        }

        self.code = project.code;
        self.prompt = project.prompt;
        self.current_project_id = Some(project.id);
        self.checkpoint = None;
        self.info(
            "Project Loaded",
            format!("\"{}\" has been loaded.", project.name),
        );
        Ok(())
    }

    /// Rename a snapshot; id and content are kept
    pub fn rename_project(&mut self, id: &str, new_name: &str) -> Result<()> {
        let Some(old_name) = self.store.get(id).map(|p| p.name.clone()) else {
            return self.fail("Project Not Found", WeaverError::NotFound(id.to_string()));
        };
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return self.fail("Invalid Name", WeaverError::invalid("Name cannot be empty."));
        }

        let result = self.store.rename(id, new_name).map(|_| ());
        let description = format!("\"{}\" renamed to \"{}\".", old_name, new_name);
        self.persisted(result, "Item Renamed", description, ())
    }

    /// Delete a snapshot; deleting the associated one empties the session
    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        let Some(name) = self.store.get(id).map(|p| p.name.clone()) else {
            return self.fail("Project Not Found", WeaverError::NotFound(id.to_string()));
        };

        let result = self.store.remove(id).map(|_| ());
        if self.current_project_id.as_deref() == Some(id) {
            self.reset();
        }

        let description = format!("\"{}\" has been deleted.", name);
        self.persisted(result, "Item Deleted", description, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    use crate::events::VecNotificationSink;
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use crate::store::tests::FailingStorage;

    /// Code model answering from fixed replies
    #[derive(Default)]
    struct ScriptedModel {
        code: Option<GenerateCodeOutput>,
        component: Option<GenerateComponentOutput>,
        edited: Option<String>,
        edited_component: Option<EditComponentOutput>,
        calls: Mutex<Vec<String>>,
    }

    fn missing<T>() -> std::result::Result<T, FlowError> {
        Err(FlowError::InvalidOutput("no reply scripted".to_string()))
    }

    #[async_trait]
    impl CodeModel for ScriptedModel {
        async fn generate_code(
            &self,
            request: &GenerateRequest,
        ) -> std::result::Result<GenerateCodeOutput, FlowError> {
            self.calls.lock().push(format!("generate_code: {}", request.prompt));
            self.code.clone().map_or_else(missing, Ok)
        }

        async fn generate_component(
            &self,
            request: &GenerateRequest,
        ) -> std::result::Result<GenerateComponentOutput, FlowError> {
            self.calls
                .lock()
                .push(format!("generate_component: {}", request.prompt));
            self.component.clone().map_or_else(missing, Ok)
        }

        async fn edit_code(
            &self,
            request: &EditCodeRequest,
        ) -> std::result::Result<EditCodeOutput, FlowError> {
            self.calls.lock().push(request.existing_code.clone());
            self.edited
                .clone()
                .map(|modified_code| EditCodeOutput { modified_code })
                .map_or_else(missing, Ok)
        }

        async fn edit_component(
            &self,
            request: &EditComponentRequest,
        ) -> std::result::Result<EditComponentOutput, FlowError> {
            self.calls.lock().push(request.existing_component.clone());
            self.edited_component.clone().map_or_else(missing, Ok)
        }
    }

    /// Name prompt answering from a queue; `None` entries cancel
    struct Answers {
        queue: VecDeque<Option<String>>,
        defaults: Vec<String>,
    }

    impl Answers {
        fn new(answers: &[Option<&str>]) -> Self {
            Self {
                queue: answers.iter().map(|a| a.map(str::to_string)).collect(),
                defaults: Vec::new(),
            }
        }
    }

    impl NamePrompt for Answers {
        fn ask(&mut self, _message: &str, default: &str) -> Option<String> {
            self.defaults.push(default.to_string());
            self.queue.pop_front().flatten()
        }
    }

    fn session(variant: Variant) -> (Session, Arc<VecNotificationSink>) {
        let sink = Arc::new(VecNotificationSink::new());
        let store = ProjectStore::new(Box::new(MemoryStorage::new()));
        (Session::new(variant, store, sink.clone()), sink)
    }

    fn page_model() -> ScriptedModel {
        ScriptedModel {
            code: Some(GenerateCodeOutput {
                html: "<h1>Hello</h1>".to_string(),
                css: "h1 { color: teal; }".to_string(),
                javascript: "console.log('hi');".to_string(),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generate_replaces_bundle() {
        let (mut session, sink) = session(Variant::MultiFile);
        let model = page_model();

        session.set_prompt("a greeting");
        session.generate(&model).await.unwrap();

        assert_eq!(
            session.code(),
            &CodeBundle::from(MultiFileCode::new(
                "<h1>Hello</h1>",
                "h1 { color: teal; }",
                "console.log('hi');"
            ))
        );
        assert!(session.can_create_checkpoint());
        assert!(!session.is_in_flight());
        assert_eq!(sink.last_title().as_deref(), Some("Code Generated"));
        assert_eq!(model.calls.lock().as_slice(), ["generate_code: a greeting"]);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected_without_a_call() {
        let (mut session, sink) = session(Variant::MultiFile);
        let model = page_model();

        session.set_prompt("   ");
        let result = session.generate(&model).await;
        assert!(matches!(result, Err(WeaverError::Validation(_))));
        assert_eq!(sink.last_title().as_deref(), Some("Prompt is empty"));
        assert!(model.calls.lock().is_empty());
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_bundle() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_section(Section::Html, "<p>keep</p>").unwrap();
        session.set_prompt("something");

        let result = session.generate(&ScriptedModel::default()).await;
        assert!(matches!(result, Err(WeaverError::Model(_))));
        assert_eq!(session.code().section(Section::Html), Some("<p>keep</p>"));
        assert_eq!(sink.last_title().as_deref(), Some("Error Generating Code"));
        assert!(!session.is_in_flight());
    }

    #[test]
    fn test_second_request_while_in_flight_is_busy() {
        let (mut session, _) = session(Variant::MultiFile);
        session.set_prompt("x");

        let invocation = session.begin_generate().unwrap();
        assert!(session.is_in_flight());
        assert!(matches!(session.begin_generate(), Err(WeaverError::Busy)));

        let reply = Ok(ModelReply::GeneratedCode(GenerateCodeOutput {
            html: "<p/>".to_string(),
            css: String::new(),
            javascript: String::new(),
        }));
        session.finish(invocation, reply).unwrap();
        assert!(!session.is_in_flight());
        assert!(session.begin_generate().is_ok());
    }

    #[tokio::test]
    async fn test_edit_round_trip_keeps_association() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();
        session.save(&mut Answers::new(&[Some("Page")])).unwrap();
        let id = session.current_project_id().unwrap().to_string();

        let model = ScriptedModel {
            edited: Some(
                "Done!\n<!-- HTML_CODE_START -->\n<h1>Hello, world</h1>\n<!-- HTML_CODE_END -->\n\
                 /* CSS_CODE_START */\nh1 { color: navy; }\n/* CSS_CODE_END */\n\
                 // JAVASCRIPT_CODE_START\n// JAVASCRIPT_CODE_END"
                    .to_string(),
            ),
            ..Default::default()
        };
        session.set_prompt("make it navy");
        session.edit(&model).await.unwrap();

        assert_eq!(
            session.code(),
            &CodeBundle::from(MultiFileCode::new("<h1>Hello, world</h1>", "h1 { color: navy; }", ""))
        );
        assert_eq!(session.current_project_id(), Some(id.as_str()));
        assert_eq!(sink.last_title().as_deref(), Some("Code Edited"));

        let sent = model.calls.lock();
        assert!(sent[0].contains("<!-- HTML_CODE_START -->\n<h1>Hello</h1>\n<!-- HTML_CODE_END -->"));
    }

    #[tokio::test]
    async fn test_format_mismatch_keeps_bundle() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();
        let before = session.code().clone();

        let model = ScriptedModel {
            edited: Some("I made the heading blue.".to_string()),
            ..Default::default()
        };
        session.set_prompt("blue heading");
        let result = session.edit(&model).await;

        assert!(matches!(result, Err(WeaverError::FormatMismatch)));
        assert_eq!(session.code(), &before);
        assert_eq!(sink.last_title().as_deref(), Some("Parsing Error"));
    }

    #[tokio::test]
    async fn test_edit_requires_code() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_prompt("change it");
        let result = session.edit(&ScriptedModel::default()).await;
        assert!(matches!(result, Err(WeaverError::Validation(_))));
        assert_eq!(sink.last_title().as_deref(), Some("No Code to Edit"));
    }

    #[tokio::test]
    async fn test_component_generate_and_edit() {
        let (mut session, _) = session(Variant::Component);
        let model = ScriptedModel {
            component: Some(GenerateComponentOutput {
                react_component: "function App() { return <p>1</p>; }".to_string(),
                css: "p{}".to_string(),
            }),
            edited_component: Some(EditComponentOutput {
                modified_component: "function App() { return <p>2</p>; }".to_string(),
                modified_css: "p{margin:0}".to_string(),
            }),
            ..Default::default()
        };

        session.set_prompt("counter");
        session.generate(&model).await.unwrap();
        assert_eq!(
            session.code().section(Section::Component),
            Some("function App() { return <p>1</p>; }")
        );

        session.set_prompt("show two");
        session.edit(&model).await.unwrap();
        assert_eq!(
            session.code(),
            &CodeBundle::from(ComponentCode::new(
                "function App() { return <p>2</p>; }",
                "p{margin:0}"
            ))
        );
    }

    #[tokio::test]
    async fn test_save_then_load_restores_state() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();

        let mut answers = Answers::new(&[Some("  Landing  ")]);
        let saved = session.save(&mut answers).unwrap().unwrap();
        assert_eq!(saved.name, "Landing");
        assert_eq!(answers.defaults, vec!["Untitled Project"]);
        assert_eq!(sink.last_title().as_deref(), Some("Project Saved"));
        assert!(!session.can_create_checkpoint());

        let saved_code = session.code().clone();
        session.clear();
        assert!(!session.code().has_code());
        assert!(session.current_project_id().is_none());

        session.load_project(&saved.id).unwrap();
        assert_eq!(session.code(), &saved_code);
        assert_eq!(session.prompt(), "a page");
        assert_eq!(session.current_project_id(), Some(saved.id.as_str()));
        assert!(!session.can_create_checkpoint());
    }

    #[tokio::test]
    async fn test_repeat_saves_update_in_place_and_copy_adds() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();

        session.save(&mut Answers::new(&[Some("Site")])).unwrap();
        session.set_section(Section::Css, "body{}").unwrap();
        let updated = session.save(&mut Answers::new(&[])).unwrap().unwrap();
        assert_eq!(session.store().len(), 1);
        assert_eq!(updated.name, "Site");
        assert_eq!(updated.code.css(), "body{}");
        assert_eq!(sink.last_title().as_deref(), Some("Project Updated"));

        let mut answers = Answers::new(&[Some("Site v2")]);
        let copy = session.save_as_copy(&mut answers).unwrap().unwrap();
        assert_eq!(answers.defaults, vec!["Copy of Site"]);
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.current_project_id(), Some(copy.id.as_str()));
    }

    #[test]
    fn test_cancel_and_blank_names() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_section(Section::Html, "<p/>").unwrap();

        assert!(session.save(&mut Answers::new(&[None])).unwrap().is_none());
        assert!(session.store().is_empty());
        assert!(sink.notifications().is_empty());

        let result = session.save(&mut Answers::new(&[Some("   ")]));
        assert!(matches!(result, Err(WeaverError::Validation(_))));
        assert_eq!(sink.last_title().as_deref(), Some("Invalid Name"));
        assert!(session.store().is_empty());
    }

    #[tokio::test]
    async fn test_checkpoint_eligibility_follows_basis() {
        let (mut session, _) = session(Variant::MultiFile);
        assert!(!session.can_create_checkpoint());

        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();
        assert!(session.can_create_checkpoint());

        // Prompt edits alone keep eligibility
        session.set_prompt("something else");
        assert!(session.can_create_checkpoint());

        session.set_section(Section::Js, "").unwrap();
        assert!(!session.can_create_checkpoint());
        session.set_section(Section::Js, "console.log('hi');").unwrap();
        assert!(session.can_create_checkpoint());

        let mut answers = Answers::new(&[Some("cp")]);
        let checkpoint = session.save_checkpoint(&mut answers).unwrap().unwrap();
        assert!(answers.defaults[0].starts_with("Untitled Project - Checkpoint "));
        assert_eq!(checkpoint.prompt, "a page");
        assert!(session.current_project_id().is_none());
        assert!(!session.can_create_checkpoint());

        let again = session.save_checkpoint(&mut Answers::new(&[Some("cp2")]));
        assert!(matches!(again, Err(WeaverError::Validation(_))));
        assert_eq!(session.store().len(), 1);
    }

    #[tokio::test]
    async fn test_checkpoint_keeps_association() {
        let (mut session, _) = session(Variant::MultiFile);
        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();
        let saved = session.save(&mut Answers::new(&[Some("Main")])).unwrap().unwrap();

        session.set_prompt("again");
        session.generate(&page_model()).await.unwrap();
        // Generation starts a new potential project
        assert!(session.current_project_id().is_none());

        session.load_project(&saved.id).unwrap();
        session.set_prompt("edit");
        let model = ScriptedModel {
            edited: Some("<!-- HTML_CODE_START -->x<!-- HTML_CODE_END -->".to_string()),
            ..Default::default()
        };
        session.edit(&model).await.unwrap();

        let mut answers = Answers::new(&[Some("")]);
        assert!(session.save_checkpoint(&mut answers).is_err());
        assert!(answers.defaults[0].starts_with("Main - Checkpoint "));

        session.save_checkpoint(&mut Answers::new(&[Some("Main cp")])).unwrap();
        assert_eq!(session.current_project_id(), Some(saved.id.as_str()));
    }

    #[tokio::test]
    async fn test_delete_active_project_clears_session() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();
        let saved = session.save(&mut Answers::new(&[Some("Doomed")])).unwrap().unwrap();

        session.delete_project(&saved.id).unwrap();
        assert!(session.store().is_empty());
        assert!(!session.code().has_code());
        assert!(session.prompt().is_empty());
        assert!(session.current_project_id().is_none());
        assert_eq!(sink.last_title().as_deref(), Some("Item Deleted"));

        assert!(matches!(
            session.delete_project(&saved.id),
            Err(WeaverError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_other_project_keeps_session() {
        let (mut session, _) = session(Variant::MultiFile);
        session.set_prompt("a page");
        session.generate(&page_model()).await.unwrap();
        let first = session.save(&mut Answers::new(&[Some("One")])).unwrap().unwrap();
        let second = session
            .save_as_copy(&mut Answers::new(&[Some("Two")]))
            .unwrap()
            .unwrap();

        session.delete_project(&first.id).unwrap();
        assert!(session.code().has_code());
        assert_eq!(session.current_project_id(), Some(second.id.as_str()));
    }

    #[test]
    fn test_rename_project() {
        let (mut session, sink) = session(Variant::MultiFile);
        session.set_section(Section::Html, "<p>x</p>").unwrap();
        let saved = session.save(&mut Answers::new(&[Some("Old")])).unwrap().unwrap();

        session.rename_project(&saved.id, "  New  ").unwrap();
        let renamed = session.store().get(&saved.id).unwrap();
        assert_eq!(renamed.name, "New");
        assert_eq!(renamed.code, saved.code);
        assert_eq!(
            sink.notifications().last().unwrap().description,
            "\"Old\" renamed to \"New\"."
        );

        assert!(session.rename_project(&saved.id, " ").is_err());
        assert_eq!(session.store().get(&saved.id).unwrap().name, "New");
    }

    #[test]
    fn test_load_rejects_other_variant() {
        let (mut session, _) = session(Variant::Component);
        let project = Project {
            id: "1".to_string(),
            name: "page".to_string(),
            code: MultiFileCode::new("<p/>", "", "").into(),
            prompt: String::new(),
        };
        session.store.insert(project).unwrap();

        assert!(matches!(
            session.load_project("1"),
            Err(WeaverError::VariantMismatch { .. })
        ));
        assert!(matches!(
            session.load_project("2"),
            Err(WeaverError::NotFound(_))
        ));
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let sink = Arc::new(VecNotificationSink::new());
        let store = ProjectStore::new(Box::new(FailingStorage));
        let mut session = Session::new(Variant::MultiFile, store, sink.clone());
        session.set_section(Section::Html, "<p/>").unwrap();

        let result = session.save(&mut Answers::new(&[Some("Unsaved")]));
        assert!(matches!(result, Err(WeaverError::Store(_))));
        assert_eq!(session.store().len(), 1);
        assert!(session.current_project_id().is_some());
        assert_eq!(sink.last_title().as_deref(), Some("Error Saving Project"));
    }

    #[test]
    fn test_upload_section() {
        let temp_dir = TempDir::new().unwrap();
        let css = temp_dir.path().join("theme.CSS");
        std::fs::write(&css, "body { margin: 0; }").unwrap();
        let txt = temp_dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();

        let (mut session, sink) = session(Variant::MultiFile);
        session.upload_section(Section::Css, &css).unwrap();
        assert_eq!(session.code().css(), "body { margin: 0; }");
        assert_eq!(sink.last_title().as_deref(), Some("CSS File Uploaded"));

        assert!(matches!(
            session.upload_section(Section::Html, &txt),
            Err(WeaverError::Validation(_))
        ));
        assert!(matches!(
            session.upload_section(Section::Component, &css),
            Err(WeaverError::Validation(_))
        ));
    }

    #[test]
    fn test_corrupt_store_is_reported_on_load() {
        let storage = MemoryStorage::new();
        storage
            .set(crate::constants::storage::PROJECTS_KEY, "[{broken")
            .unwrap();
        let sink = Arc::new(VecNotificationSink::new());
        let store = ProjectStore::new(Box::new(storage));
        let mut session = Session::new(Variant::MultiFile, store, sink.clone());

        let result = session.load_projects();
        assert!(matches!(result, Err(WeaverError::Store(StoreError::Load(_)))));
        assert_eq!(sink.last_title().as_deref(), Some("Error loading projects"));
        assert!(sink.notifications()[0].is_error());
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_set_section_outside_variant() {
        let (mut session, _) = session(Variant::Component);
        assert!(session.set_section(Section::Html, "<p/>").is_err());
        assert!(session.set_section(Section::Component, "function App() {}").is_ok());
    }
}
