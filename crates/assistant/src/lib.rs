//! The conversation core of Veloce.
//!
//! Every user turn goes through the same steps:
//!
//! 1. **Route** the utterance (music, vehicle control, SOS, or forward)
//! 2. **Dispatch** matched commands straight to their capability; the
//!    result becomes the assistant reply and no model is called
//! 3. **Refresh** the system prompt from the selected vehicle and the
//!    current environment
//! 4. **Append** the user turn (with the attached image, if any)
//! 5. **Respond** through the text-only or multimodal model, depending on
//!    whether an image is attached
//!
//! [`Session`] ties the steps together and owns one [`ConversationState`].

pub mod context;
pub mod conversation;
pub mod dispatch;
pub mod pipeline;
pub mod router;
pub mod session;
pub mod vehicle_control;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{
    CAPABILITY_MANIFEST, ContextAssembler, EnvironmentGatherer, SystemPromptContext,
    VELOCE_PERSONA, resolve_city_name,
};
pub use conversation::ConversationState;
pub use dispatch::CommandDispatcher;
pub use pipeline::{
    InvocationMode, ModelInvocationError, ResponsePipeline, multimodal_history, text_only_history,
};
pub use router::{CommandRouter, RouteDecision, Subsystem};
pub use session::{Session, SessionError, TurnOutcome};
pub use vehicle_control::{ControlOutcome, VehicleController};
