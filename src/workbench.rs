//! Workbench: one instance of every orchestration component plus the injected ports.
//!
//! This is the single state machine instance the presentation layer talks to. Mode
//! changes, form input, submits and copies all go through it; it forwards each event to
//! the component that owns the affected state.

use crate::clipboard::{ClipboardLifetime, ClipboardService, CopyIndicator, CopyResult, CopyState};
use crate::config::FlexgenConfig;
use crate::download::{DirectorySaver, FileSavePort, SavedFile};
use crate::error::GenerationError;
use crate::lifecycle::{LifecycleController, Resolution, SubmissionState, SubmitDecision, Ticket};
use crate::mode::{DataGenerationSubtype, GenerationMode, ModeChange, ModeSelector};
use crate::request::{RecordCount, RequestBuilder, RequestDescriptor, RequestInputs};
use crate::response::{Outcome, ResponseHandler};
use crate::transport::{HttpTransport, Transport};
use std::time::Instant;
use tracing::{debug, info};

/// Send a request and interpret its response. Transport errors come back as `Err`.
pub async fn dispatch(
    transport: &dyn Transport,
    request: &RequestDescriptor,
) -> Result<Outcome, GenerationError> {
    let raw = transport.send(request).await?;
    let status = raw.status;
    let outcome = ResponseHandler::interpret(raw, request.expects_file, request.target);
    info!(
        endpoint = %request.endpoint,
        status,
        failed = outcome.is_failure(),
        "Generation request resolved"
    );
    Ok(outcome)
}

pub struct Workbench {
    selector: ModeSelector,
    inputs: RequestInputs,
    builder: RequestBuilder,
    controller: LifecycleController,
    transport: Box<dyn Transport>,
    saver: Box<dyn FileSavePort>,
    clipboard: ClipboardService,
    copy_indicator: CopyIndicator,
    last_saved: Option<SavedFile>,
}

impl Workbench {
    pub fn new(
        config: &FlexgenConfig,
        transport: Box<dyn Transport>,
        saver: Box<dyn FileSavePort>,
        clipboard: ClipboardService,
    ) -> Self {
        Self {
            selector: ModeSelector::default(),
            inputs: RequestInputs::default(),
            builder: RequestBuilder::new(config.server.base_url.clone()),
            controller: LifecycleController::new(config.lifecycle.stale_responses),
            transport,
            saver,
            clipboard,
            copy_indicator: CopyIndicator::new(config.clipboard.copied_indicator()),
            last_saved: None,
        }
    }

    /// Workbench wired to reqwest, the output directory and the system clipboard.
    /// `lifetime` says whether the process outlives its copies.
    pub fn native(
        config: &FlexgenConfig,
        lifetime: ClipboardLifetime,
    ) -> Result<Self, GenerationError> {
        let transport = HttpTransport::new(&config.server)?;
        let saver = DirectorySaver::new(config.output.resolve_directory());
        let clipboard =
            ClipboardService::native(config.clipboard.fallback_command.clone(), lifetime);
        Ok(Self::new(config, Box::new(transport), Box::new(saver), clipboard))
    }

    pub fn mode(&self) -> GenerationMode {
        self.selector.mode()
    }

    pub fn subtype(&self) -> DataGenerationSubtype {
        self.selector.subtype()
    }

    pub fn inputs(&self) -> &RequestInputs {
        &self.inputs
    }

    pub fn state(&self) -> &SubmissionState {
        self.controller.state()
    }

    /// The submit control is disabled while a request is in flight
    pub fn can_submit(&self) -> bool {
        !self.controller.is_submitting()
    }

    pub fn inline_result(&self) -> Option<&str> {
        self.controller.inline_result()
    }

    pub fn last_saved(&self) -> Option<&SavedFile> {
        self.last_saved.as_ref()
    }

    pub fn copy_state(&mut self, now: Instant) -> CopyState {
        self.copy_indicator.poll(now)
    }

    pub fn set_mode(&mut self, mode: GenerationMode) -> ModeChange {
        let change = self.selector.set_mode(mode);
        self.controller.on_mode_change(change);
        self.copy_indicator.reset();
        self.last_saved = None;
        change
    }

    pub fn set_subtype(&mut self, subtype: DataGenerationSubtype) {
        self.selector.set_subtype(subtype);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.inputs.set_text(text);
    }

    pub fn set_count(&mut self, count: i64) {
        self.inputs.set_count(count);
    }

    pub fn set_count_raw(&mut self, raw: &str) {
        self.inputs.set_count_raw(raw);
    }

    pub fn count(&self) -> RecordCount {
        self.inputs.count
    }

    /// Submit event: validate, build and move to `Submitting`
    pub fn begin_submit(&mut self) -> SubmitDecision {
        let mode = self.selector.mode();
        let subtype = self.selector.subtype();
        let builder = &self.builder;
        let inputs = &self.inputs;
        let decision = self
            .controller
            .submit(mode, || builder.build(mode, subtype, &inputs.text, inputs.count));
        // Anything but a rejected double submit replaces the previous result
        if !matches!(decision, SubmitDecision::Rejected) {
            self.copy_indicator.reset();
            self.last_saved = None;
        }
        decision
    }

    /// Resolve an in-flight submission
    pub fn finish_submit(
        &mut self,
        ticket: &Ticket,
        result: Result<Outcome, GenerationError>,
    ) -> Resolution {
        let active_mode = self.selector.mode();
        let resolution = self
            .controller
            .resolve(ticket, result, active_mode, self.saver.as_mut());
        if let Resolution::Applied { saved: Some(saved) } = &resolution {
            self.last_saved = Some(saved.clone());
        }
        resolution
    }

    /// Full submit: validate, send, interpret, resolve
    pub async fn submit(&mut self) -> &SubmissionState {
        match self.begin_submit() {
            SubmitDecision::Started { ticket, request } => {
                let result = dispatch(self.transport.as_ref(), &request).await;
                self.finish_submit(&ticket, result);
            }
            SubmitDecision::Rejected => debug!("Submit ignored while a request is in flight"),
            SubmitDecision::Invalid(err) => debug!(error = %err, "Submit failed validation"),
        }
        self.controller.state()
    }

    /// Copy the current inline result. `None` when there is nothing to copy.
    pub fn copy_result(&mut self, now: Instant) -> Option<CopyResult> {
        let text = self.controller.inline_result()?.to_string();
        let result = self.clipboard.copy(&text);
        self.copy_indicator.record(&result, now);
        Some(result)
    }
}
