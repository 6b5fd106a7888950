pub mod constraints;
pub mod model;
pub mod parser;
pub mod validator;

pub use constraints::{validate_constraint, validate_field};
pub use model::{
    Action, ActionInput, Channels, CliChannel, Constraint, ConstraintKind, Endpoint, Field,
    FieldType, GrpcChannel, HttpChannel, Module, ModuleMeta, TtyChannel, WebSocketChannel,
    WebhookChannel, IMPLICIT_ACTIONS,
};
pub use parser::{DocumentFormat, ModuleParser};
pub use validator::{ModuleValidator, HTTP_METHODS};
