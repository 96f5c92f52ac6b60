pub mod todo;
pub mod user;

pub use todo::{NewTodo, NewTodoRequest, Todo, UpdateTodoRequest};
pub use user::User;
