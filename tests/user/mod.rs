use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use faire::{Command, CommandError, CommandHandler, Response};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("email {0} is already registered")]
    EmailTaken(String),
    #[error("no user found with id {0}")]
    NotFound(Uuid),
}

pub trait UserRepository: Send + Sync + 'static {
    fn add(&self, user: User) -> Result<Uuid, UserError>;

    fn find_by_id(&self, id: Uuid) -> Result<User, UserError>;

    fn get_all(&self) -> Vec<User>;
}

/// Users kept in memory. Emails are unique.
#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl UserRepository for InMemoryUserRepository {
    fn add(&self, user: User) -> Result<Uuid, UserError> {
        let mut users = self.users.lock().unwrap();

        if let Some(email) = &user.email {
            if users.values().any(|u| u.email.as_ref() == Some(email)) {
                return Err(UserError::EmailTaken(email.clone()));
            }
        }

        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<User, UserError> {
        self.users.lock().unwrap().get(&id).cloned().ok_or(UserError::NotFound(id))
    }

    fn get_all(&self) -> Vec<User> {
        self.users.lock().unwrap().values().cloned().collect()
    }
}

#[derive(Debug)]
pub struct RegisterUser {
    pub username: String,
    pub email: Option<String>,
}

impl Command for RegisterUser {}

pub struct RegisterUserHandler<R> {
    pub repository: R,
}

impl<R> CommandHandler for RegisterUserHandler<R>
where
    R: UserRepository,
{
    type Command = RegisterUser;

    fn handle(&self, command: &RegisterUser) -> Result<Response, CommandError> {
        let id = self
            .repository
            .add(User {
                id: Uuid::new_v4(),
                username: command.username.clone(),
                email: command.email.clone(),
            })
            .map_err(CommandError::rejected)?;

        Ok(Response::with_payload(id)?)
    }
}
