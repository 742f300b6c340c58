//! One user's conversation with the assistant.
//!
//! All operations take `&mut self`, so nothing interleaves within a
//! session. Separate sessions share no conversation state.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use veloce_core::error::{ProviderError, StoreError};
use veloce_core::message::ImageAttachment;
use veloce_core::speech::{AudioClip, SpeechToText, TextToSpeech};
use veloce_core::vehicle::{MaintenanceRecord, VehicleSnapshot, VehicleStore};

use crate::context::{ContextAssembler, EnvironmentGatherer, SystemPromptContext};
use crate::conversation::ConversationState;
use crate::dispatch::CommandDispatcher;
use crate::pipeline::{ModelInvocationError, ResponsePipeline};
use crate::router::CommandRouter;
use crate::vehicle_control::VehicleController;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    ModelInvocation(#[from] ModelInvocationError),

    #[error("Vehicle store error: {0}")]
    Store(#[from] StoreError),

    #[error("No vehicle selected")]
    NoVehicleSelected,

    #[error("Transcription failed: {0}")]
    Transcription(ProviderError),
}

/// What a submitted turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A command was handled without calling the model.
    Command { reply: String },
    /// The model answered.
    Reply { text: String },
    /// The recording held no speech; nothing was recorded.
    NoSpeech,
}

impl TurnOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            TurnOutcome::Command { reply } => Some(reply),
            TurnOutcome::Reply { text } => Some(text),
            TurnOutcome::NoSpeech => None,
        }
    }
}

pub struct Session {
    state: ConversationState,
    store: Arc<dyn VehicleStore>,
    assembler: ContextAssembler,
    environment: EnvironmentGatherer,
    router: CommandRouter,
    dispatcher: CommandDispatcher,
    pipeline: ResponsePipeline,
    transcriber: Option<Arc<dyn SpeechToText>>,
    speaker: Option<Arc<dyn TextToSpeech>>,
    vehicle: Option<VehicleSnapshot>,
    maintenance_limit: usize,
}

impl Session {
    pub fn new(
        store: Arc<dyn VehicleStore>,
        pipeline: ResponsePipeline,
        environment: EnvironmentGatherer,
        dispatcher: CommandDispatcher,
    ) -> Self {
        Self {
            state: ConversationState::new(),
            store,
            assembler: ContextAssembler::new(),
            environment,
            router: CommandRouter::new(),
            dispatcher,
            pipeline,
            transcriber: None,
            speaker: None,
            vehicle: None,
            maintenance_limit: 3,
        }
    }

    pub fn with_assembler(mut self, assembler: ContextAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_transcriber(mut self, transcriber: Option<Arc<dyn SpeechToText>>) -> Self {
        self.transcriber = transcriber;
        self
    }

    /// Speak every reply through `speaker`.
    pub fn with_speaker(mut self, speaker: Option<Arc<dyn TextToSpeech>>) -> Self {
        self.speaker = speaker;
        self
    }

    /// Maintenance records summarised in the system prompt (0 disables).
    pub fn with_maintenance_limit(mut self, limit: usize) -> Self {
        self.maintenance_limit = limit;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn vehicle(&self) -> Option<&VehicleSnapshot> {
        self.vehicle.as_ref()
    }

    pub fn controller(&self) -> &VehicleController {
        self.dispatcher.controller()
    }

    pub fn store(&self) -> &Arc<dyn VehicleStore> {
        &self.store
    }

    /// Make `id` the current vehicle and rebuild the system prompt for it.
    pub async fn select_vehicle(&mut self, id: i64) -> Result<&VehicleSnapshot, SessionError> {
        let vehicle = self.store.get_vehicle(id).await?;
        info!(vehicle_id = id, vehicle = %vehicle.display_name(), "Vehicle selected");
        self.refresh_context(&vehicle).await;
        Ok(self.vehicle.insert(vehicle))
    }

    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.state.attach_image(image);
    }

    pub fn clear_image(&mut self) {
        self.state.clear_image();
    }

    /// Handle one typed (or transcribed) user turn.
    pub async fn submit_text(&mut self, text: &str) -> Result<TurnOutcome, SessionError> {
        let decision = self.router.route(text);
        debug!(?decision, "Routed utterance");

        if let Some(reply) = self.dispatcher.dispatch(&decision).await {
            self.state.append_user(text);
            self.state.append_assistant(reply.clone());
            self.speak(&reply).await;
            return Ok(TurnOutcome::Command { reply });
        }

        // Context is refreshed before the user turn is recorded, so a store
        // failure leaves the history untouched.
        let id = self
            .vehicle
            .as_ref()
            .map(|v| v.id)
            .ok_or(SessionError::NoVehicleSelected)?;
        let vehicle = self.store.get_vehicle(id).await?;
        self.refresh_context(&vehicle).await;
        self.vehicle = Some(vehicle);

        self.state.append_user(text);
        let reply = self.pipeline.respond(&mut self.state).await?;
        self.speak(&reply).await;
        Ok(TurnOutcome::Reply { text: reply })
    }

    /// Transcribe a recording. `Ok(None)` when it holds no speech.
    pub async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>, SessionError> {
        let Some(transcriber) = &self.transcriber else {
            return Err(SessionError::Transcription(ProviderError::NotConfigured(
                "speech-to-text".into(),
            )));
        };
        let transcript = transcriber
            .transcribe(clip)
            .await
            .map_err(SessionError::Transcription)?;
        Ok(transcript
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    /// Handle one spoken turn.
    pub async fn submit_voice(&mut self, clip: &AudioClip) -> Result<TurnOutcome, SessionError> {
        match self.transcribe(clip).await? {
            Some(text) => {
                info!(chars = text.len(), "Voice input transcribed");
                self.submit_text(&text).await
            }
            None => {
                warn!(duration_secs = clip.duration_secs(), "No speech detected in recording");
                Ok(TurnOutcome::NoSpeech)
            }
        }
    }

    async fn refresh_context(&mut self, vehicle: &VehicleSnapshot) {
        let environment = self.environment.gather(Utc::now()).await;
        let maintenance = self.recent_maintenance(vehicle.id).await;
        let prompt = self.assembler.assemble(&SystemPromptContext {
            vehicle,
            environment: &environment,
            maintenance: &maintenance,
        });
        self.state.refresh_system_prompt(prompt);
    }

    async fn recent_maintenance(&self, vehicle_id: i64) -> Vec<MaintenanceRecord> {
        if self.maintenance_limit == 0 {
            return Vec::new();
        }
        match self.store.maintenance_records(vehicle_id).await {
            Ok(mut records) => {
                records.truncate(self.maintenance_limit);
                records
            }
            Err(e) => {
                warn!(vehicle_id, error = %e, "Maintenance history unavailable");
                Vec::new()
            }
        }
    }

    async fn speak(&self, text: &str) {
        let Some(speaker) = &self.speaker else {
            return;
        };
        if let Err(e) = speaker.speak(text).await {
            warn!(speaker = speaker.name(), error = %e, "Text-to-speech failed");
        }
    }
}
