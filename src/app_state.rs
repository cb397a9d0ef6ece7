use derivative::Derivative;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection};

#[derive(Derivative)]
#[derivative(Debug)]
pub struct AppState {
    #[derivative(Debug = "ignore")]
    pub pg_pool: Pool<AsyncPgConnection>,
}
