pub mod oauth_state;
