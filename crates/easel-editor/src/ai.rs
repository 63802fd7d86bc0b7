//! AI collaborator boundary.
//!
//! Image generation and background removal are network calls owned by the
//! host; the session never awaits anything. The host implements
//! [`ImageServices`] and invokes session methods only after its own async
//! result has resolved, handing over plain URLs.
//!
//! Implemented differently by each environment:
//! - Browser: fetch against the API route, resolved in JS before calling in
//! - Tests: a canned map of responses

/// Host-provided image capabilities. A failure is a user-visible message,
/// never a scene or history fault.
pub trait ImageServices {
    /// Produce an image for `prompt`, returning its URL.
    fn generate_image(&self, prompt: &str) -> Result<String, String>;

    /// Produce a copy of the image at `image_url` with its background
    /// removed, returning the new URL.
    fn remove_background(&self, image_url: &str) -> Result<String, String>;
}
