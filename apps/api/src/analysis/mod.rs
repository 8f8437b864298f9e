pub mod error;
pub mod extract;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod repair;
pub mod request;
pub mod validate;

#[cfg(test)]
pub mod test_support;
