//! Command contract
//!
//! A command converts between wire documents and its typed argument and
//! result. Server-side roles always need `unmarshall_arg` and
//! `marshall_result`; the client-side directions are optional and each
//! command lists the directions it implements in [`Command::DIRECTIONS`].
//!
//! [`AnyCommand`] is the object-safe view used by the registry and the
//! dispatcher, with arguments and results carried as `Box<dyn Any + Send>`.

use std::any::{type_name, Any};

use bson::Document;
use mongowire_common::{CodecError, CodecResult, Direction, MongoError, MongoResult, UnsupportedDirection};
use tracing::warn;

/// Server-side directions, implemented by every command
pub const SERVER_DIRECTIONS: &[Direction] = &[Direction::UnmarshallArg, Direction::MarshallResult];

/// Every direction
pub const ALL_DIRECTIONS: &[Direction] = &[
    Direction::MarshallArg,
    Direction::UnmarshallArg,
    Direction::MarshallResult,
    Direction::UnmarshallResult,
];

pub trait Command: Send + Sync + 'static {
    type Argument: Send + 'static;
    type Result: Send + 'static;

    /// Directions this command implements
    const DIRECTIONS: &'static [Direction] = SERVER_DIRECTIONS;

    /// Wire token, matched case-insensitively
    fn name(&self) -> &'static str;

    /// Routing hint for the executor. Not enforced here.
    fn is_readable_from_secondary(&self) -> bool {
        false
    }

    fn supports(&self, direction: Direction) -> bool {
        Self::DIRECTIONS.contains(&direction)
    }

    fn unmarshall_arg(&self, doc: &Document) -> MongoResult<Self::Argument>;

    /// Errors are reported as [`MongoError::Marshal`]
    fn marshall_result(&self, result: &Self::Result) -> MongoResult<Document>;

    fn marshall_arg(&self, _arg: &Self::Argument) -> CodecResult<Document> {
        Err(unsupported(self.name(), Direction::MarshallArg))
    }

    fn unmarshall_result(&self, _doc: &Document) -> CodecResult<Self::Result> {
        Err(unsupported(self.name(), Direction::UnmarshallResult))
    }
}

pub fn unsupported(command: &'static str, direction: Direction) -> CodecError {
    warn!(command, %direction, "unsupported command direction requested");
    UnsupportedDirection { command, direction }.into()
}

pub type AnyArgument = Box<dyn Any + Send>;
pub type AnyResult = Box<dyn Any + Send>;

/// Type-erased command, implemented for every [`Command`]
pub trait AnyCommand: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_readable_from_secondary(&self) -> bool;

    fn supports(&self, direction: Direction) -> bool;

    fn unmarshall_arg(&self, doc: &Document) -> MongoResult<AnyArgument>;

    fn marshall_arg(&self, arg: &(dyn Any + Send)) -> CodecResult<Document>;

    fn unmarshall_result(&self, doc: &Document) -> CodecResult<AnyResult>;

    fn marshall_result(&self, result: &(dyn Any + Send)) -> MongoResult<Document>;
}

fn wrong_type<T>(command: &str, what: &str) -> MongoError {
    MongoError::bad_value(format!(
        "{command}: {what} is not a {}",
        type_name::<T>()
    ))
}

impl<C: Command> AnyCommand for C {
    fn name(&self) -> &'static str {
        Command::name(self)
    }

    fn is_readable_from_secondary(&self) -> bool {
        Command::is_readable_from_secondary(self)
    }

    fn supports(&self, direction: Direction) -> bool {
        Command::supports(self, direction)
    }

    fn unmarshall_arg(&self, doc: &Document) -> MongoResult<AnyArgument> {
        Ok(Box::new(Command::unmarshall_arg(self, doc)?))
    }

    fn marshall_arg(&self, arg: &(dyn Any + Send)) -> CodecResult<Document> {
        let arg = arg
            .downcast_ref::<C::Argument>()
            .ok_or_else(|| wrong_type::<C::Argument>(Command::name(self), "argument"))?;
        Command::marshall_arg(self, arg)
    }

    fn unmarshall_result(&self, doc: &Document) -> CodecResult<AnyResult> {
        Ok(Box::new(Command::unmarshall_result(self, doc)?))
    }

    fn marshall_result(&self, result: &(dyn Any + Send)) -> MongoResult<Document> {
        let result = result
            .downcast_ref::<C::Result>()
            .ok_or_else(|| MongoError::marshal(wrong_type::<C::Result>(Command::name(self), "result")))?;
        Command::marshall_result(self, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    struct EchoCommand;

    impl Command for EchoCommand {
        type Argument = i32;
        type Result = String;

        fn name(&self) -> &'static str {
            "echo"
        }

        fn unmarshall_arg(&self, doc: &Document) -> MongoResult<i32> {
            doc.get_i32("echo").map_err(|_| MongoError::no_such_key("echo"))
        }

        fn marshall_result(&self, result: &String) -> MongoResult<Document> {
            Ok(doc! { "echoed": result.as_str() })
        }
    }

    #[test]
    fn test_default_directions() {
        let cmd = EchoCommand;
        assert!(Command::supports(&cmd, Direction::UnmarshallArg));
        assert!(Command::supports(&cmd, Direction::MarshallResult));
        assert!(!Command::supports(&cmd, Direction::MarshallArg));

        let err = Command::marshall_arg(&cmd, &1).unwrap_err();
        assert_eq!(
            err,
            CodecError::Unsupported(UnsupportedDirection {
                command: "echo",
                direction: Direction::MarshallArg,
            })
        );
        assert!(Command::unmarshall_result(&cmd, &doc! {}).unwrap_err().is_unsupported());
        assert!(!Command::is_readable_from_secondary(&cmd));
    }

    #[test]
    fn test_erased_round_trip() {
        let cmd: &dyn AnyCommand = &EchoCommand;
        let arg = cmd.unmarshall_arg(&doc! { "echo": 7_i32 }).unwrap();
        assert_eq!(arg.downcast_ref::<i32>(), Some(&7));

        let result: AnyResult = Box::new("hi".to_string());
        assert_eq!(cmd.marshall_result(&*result).unwrap(), doc! { "echoed": "hi" });
    }

    #[test]
    fn test_erased_wrong_result_type_is_marshal_error() {
        let cmd: &dyn AnyCommand = &EchoCommand;
        let result: AnyResult = Box::new(5_u8);
        let err = cmd.marshall_result(&*result).unwrap_err();
        assert!(matches!(err, MongoError::Marshal(_)));
    }
}
