use crate::modules::imagen::{GenerateError, GenerationBackend};
use crate::modules::prompt;
use crate::modules::state::AppState;
use std::sync::{Arc, Mutex};
use std::thread;

pub const IMAGE_COUNT: u32 = 4;

pub const MSG_VALIDATION: &str = "Please enter a brand name to generate a logo.";
pub const MSG_EMPTY: &str =
    "The API did not return any images. Please try refining your prompt.";
pub const MSG_INVALID_KEY: &str =
    "Invalid API Key. Please ensure your API key is correctly configured.";
pub const MSG_RATE_LIMITED: &str =
    "You have exceeded the request limit. Please wait a while before trying again.";
pub const MSG_SAFETY_BLOCKED: &str =
    "Your prompt was blocked due to safety concerns. Please modify your prompt and try again.";
pub const MSG_GENERIC: &str =
    "An error occurred while generating the logo. Please check your input and try again.";

// The remote service only gives us a human-readable message, so failures are
// bucketed by case-insensitive substring. Unmatched errors always fall
// through to the generic message.
pub fn friendly_message(err: &GenerateError) -> &'static str {
    match err {
        GenerateError::MissingKey => MSG_INVALID_KEY,
        GenerateError::Empty => MSG_EMPTY,
        _ => {
            let text: String = err.to_string().to_lowercase();
            if text.contains("api key not valid") {
                MSG_INVALID_KEY
            } else if text.contains("rate limit") {
                MSG_RATE_LIMITED
            } else if text.contains("prompt was blocked") {
                MSG_SAFETY_BLOCKED
            } else {
                MSG_GENERIC
            }
        }
    }
}

pub enum Outcome {
    Images(Vec<Vec<u8>>),
    Error(String),
}

// Idle -> Requesting -> (Completed | Failed) -> Idle. The request runs on a
// worker thread; its result lands in `pending` and is drained by `poll` from
// the UI thread each frame.
pub struct Generator {
    backend: Arc<dyn GenerationBackend>,
    pending: Arc<Mutex<Option<Result<Vec<Vec<u8>>, GenerateError>>>>,
    in_flight: bool,
}

impl Generator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            pending: Arc::new(Mutex::new(None)),
            in_flight: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight
    }

    // Validates, builds the prompt, and spawns the request. Returns the
    // prompt that was sent, or the user-facing message that blocked it.
    // No request leaves the process when validation fails.
    pub fn start(&mut self, state: &AppState) -> Result<String, String> {
        if self.in_flight {
            return Err(MSG_GENERIC.to_string());
        }
        if state.form_data.brand_name.is_empty() {
            return Err(MSG_VALIDATION.to_string());
        }

        let prompt: String = prompt::build_prompt(state);
        let backend: Arc<dyn GenerationBackend> = Arc::clone(&self.backend);
        let pending = Arc::clone(&self.pending);
        let thread_prompt: String = prompt.clone();
        let aspect_ratio = state.aspect_ratio;

        *pending.lock().unwrap() = None;
        self.in_flight = true;
        thread::spawn(move || {
            let result = backend.generate(&thread_prompt, IMAGE_COUNT, aspect_ratio);
            if let Err(e) = &result {
                log::warn!("generation failed: {}", e);
            }
            *pending.lock().unwrap() = Some(result);
        });
        Ok(prompt)
    }

    pub fn poll(&mut self) -> Option<Outcome> {
        if !self.in_flight {
            return None;
        }
        let result = self.pending.lock().unwrap().take()?;
        self.in_flight = false;
        Some(match result {
            Ok(images) if images.is_empty() => Outcome::Error(MSG_EMPTY.to_string()),
            Ok(images) => Outcome::Images(images),
            Err(e) => Outcome::Error(friendly_message(&e).to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::state::AspectRatio;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    struct MockBackend {
        calls: AtomicUsize,
        response: Mutex<Option<Result<Vec<Vec<u8>>, GenerateError>>>,
    }

    impl MockBackend {
        fn returning(response: Result<Vec<Vec<u8>>, GenerateError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Mutex::new(Some(response)),
            })
        }
    }

    impl GenerationBackend for MockBackend {
        fn generate(
            &self,
            _prompt: &str,
            _image_count: u32,
            _aspect_ratio: AspectRatio,
        ) -> Result<Vec<Vec<u8>>, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.lock().unwrap().take().unwrap()
        }
    }

    fn wait_for_outcome(generator: &mut Generator) -> Outcome {
        let deadline: Instant = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = generator.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "generation never completed");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn state_with_brand(brand: &str) -> AppState {
        let mut state: AppState = AppState::default();
        state.form_data.brand_name = brand.to_string();
        state
    }

    #[test]
    fn empty_brand_name_blocks_without_remote_call() {
        let backend = MockBackend::returning(Ok(vec![vec![1]]));
        let mut generator: Generator = Generator::new(backend.clone());

        let result = generator.start(&AppState::default());
        assert_eq!(result.unwrap_err(), MSG_VALIDATION);
        assert!(!generator.is_running());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn successful_generation_delivers_images() {
        let backend = MockBackend::returning(Ok(vec![vec![1, 2], vec![3, 4]]));
        let mut generator: Generator = Generator::new(backend.clone());

        let prompt: String = generator.start(&state_with_brand("Acme")).unwrap();
        assert!(prompt.contains("\"Acme\""));
        assert!(generator.is_running());

        match wait_for_outcome(&mut generator) {
            Outcome::Images(images) => assert_eq!(images.len(), 2),
            Outcome::Error(e) => panic!("unexpected error: {}", e),
        }
        assert!(!generator.is_running());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_images_surface_the_refine_message() {
        let backend = MockBackend::returning(Ok(vec![]));
        let mut generator: Generator = Generator::new(backend);

        generator.start(&state_with_brand("Acme")).unwrap();
        match wait_for_outcome(&mut generator) {
            Outcome::Error(message) => assert_eq!(message, MSG_EMPTY),
            Outcome::Images(_) => panic!("expected the empty-result message"),
        }
    }

    #[test]
    fn backend_errors_map_to_friendly_messages() {
        let backend = MockBackend::returning(Err(GenerateError::Api {
            message: "Rate limit exceeded".to_string(),
        }));
        let mut generator: Generator = Generator::new(backend);

        generator.start(&state_with_brand("Acme")).unwrap();
        match wait_for_outcome(&mut generator) {
            Outcome::Error(message) => assert_eq!(message, MSG_RATE_LIMITED),
            Outcome::Images(_) => panic!("expected an error outcome"),
        }
    }

    #[test]
    fn classification_is_case_insensitive_substring() {
        let api = |message: &str| GenerateError::Api { message: message.to_string() };
        assert_eq!(friendly_message(&api("API key not valid.")), MSG_INVALID_KEY);
        assert_eq!(friendly_message(&api("API KEY NOT VALID. [400]")), MSG_INVALID_KEY);
        assert_eq!(friendly_message(&api("Rate limit exceeded")), MSG_RATE_LIMITED);
        assert_eq!(
            friendly_message(&api("Your prompt was blocked by the safety system")),
            MSG_SAFETY_BLOCKED
        );
        assert_eq!(friendly_message(&api("internal server error")), MSG_GENERIC);
        assert_eq!(friendly_message(&GenerateError::MissingKey), MSG_INVALID_KEY);
        assert_eq!(friendly_message(&GenerateError::Empty), MSG_EMPTY);
    }
}
