use std::sync::{Arc, Mutex};

use faire::{
    ChainLink, Command, CommandChain, CommandDispatcher, CommandError, CommandMiddleware, Next, Response,
    TracingMiddleware,
};
use uuid::Uuid;

use crate::user::{InMemoryUserRepository, RegisterUser, RegisterUserHandler, UserError, UserRepository};

#[derive(Debug)]
struct UnknownCommand;

impl Command for UnknownCommand {}

type Spy = Arc<Mutex<Vec<String>>>;

struct SpyMiddleware {
    spy: Spy,
    name: &'static str,
}

impl SpyMiddleware {
    fn new(spy: &Spy, name: &'static str) -> Self {
        Self { spy: spy.clone(), name }
    }
}

impl CommandMiddleware for SpyMiddleware {
    fn handle(&self, command: &dyn Command, next: Next<'_>) -> Result<Response, CommandError> {
        self.spy.lock().unwrap().push(format!("{} before", self.name));
        let response = next.run(command);
        self.spy.lock().unwrap().push(format!("{} after", self.name));
        response
    }
}

fn register_user(username: &str, email: &str) -> RegisterUser {
    RegisterUser {
        username: username.to_string(),
        email: Some(email.to_string()),
    }
}

#[test]
fn dispatch_test() {
    let repository = InMemoryUserRepository::default();
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register_handler(RegisterUserHandler {
        repository: repository.clone(),
    });

    assert!(repository.get_all().is_empty());

    let first_user_id: Uuid = dispatcher
        .dispatch(&register_user("foo", "foo@faire.io"))
        .unwrap()
        .payload_as()
        .unwrap()
        .unwrap();

    assert_eq!(repository.get_all().len(), 1);
    assert_eq!(repository.find_by_id(first_user_id).unwrap().username, "foo");
    assert!(matches!(repository.find_by_id(Uuid::new_v4()), Err(UserError::NotFound(_))));

    let error = dispatcher.dispatch(&UnknownCommand).unwrap_err();
    assert!(matches!(error, CommandError::HandlerNotFound(name) if name.ends_with("UnknownCommand")));
    assert_eq!(repository.get_all().len(), 1);
}

#[test]
fn middleware_chain_test() {
    let spy = Spy::default();
    let repository = InMemoryUserRepository::default();
    let mut dispatcher = CommandDispatcher::new();

    dispatcher
        .register_handlers(vec![
            ChainLink::middleware(SpyMiddleware::new(&spy, "foo")),
            ChainLink::middleware(SpyMiddleware::new(&spy, "bar")),
            ChainLink::middleware(SpyMiddleware::new(&spy, "baz")),
            ChainLink::handler(RegisterUserHandler {
                repository: repository.clone(),
            }),
        ])
        .unwrap();

    let first_user_id: Uuid = dispatcher
        .dispatch(&register_user("foo", "foo@faire.io"))
        .unwrap()
        .payload_as()
        .unwrap()
        .unwrap();

    assert_eq!(
        *spy.lock().unwrap(),
        vec!["foo before", "bar before", "baz before", "baz after", "bar after", "foo after"]
    );
    assert_eq!(repository.get_all().len(), 1);
    assert!(repository.find_by_id(first_user_id).is_ok());
}

#[test]
fn domain_errors_propagate_through_the_chain_test() {
    let spy = Spy::default();
    let repository = InMemoryUserRepository::default();
    let mut dispatcher = CommandDispatcher::new();

    dispatcher.register(
        CommandChain::builder()
            .add_middleware(TracingMiddleware)
            .add_middleware(SpyMiddleware::new(&spy, "spy"))
            .build(RegisterUserHandler {
                repository: repository.clone(),
            }),
    );

    dispatcher.dispatch(&register_user("foo", "shared@faire.io")).unwrap();
    let error = dispatcher
        .dispatch(&register_user("bar", "shared@faire.io"))
        .unwrap_err();

    assert_eq!(error.to_string(), "email shared@faire.io is already registered");
    assert_eq!(repository.get_all().len(), 1);
    assert_eq!(
        *spy.lock().unwrap(),
        vec!["spy before", "spy after", "spy before", "spy after"]
    );
}

#[test]
fn unset_fields_are_explicitly_absent_test() {
    let repository = InMemoryUserRepository::default();
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register_handler(RegisterUserHandler {
        repository: repository.clone(),
    });

    let id: Uuid = dispatcher
        .dispatch(&RegisterUser {
            username: "anonymous".to_string(),
            email: None,
        })
        .unwrap()
        .payload_as()
        .unwrap()
        .unwrap();

    assert_eq!(repository.find_by_id(id).unwrap().email, None);
}
