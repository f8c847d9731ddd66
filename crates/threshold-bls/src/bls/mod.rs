/// BLS signatures with public keys on G2 and signatures on G1, as in
/// https://crypto.stanford.edu/~dabo/pubs/papers/BLSmultisig.html.
mod secret;
pub use secret::PrivateKey;

mod public;
pub use public::{G1Key, PublicKey};

mod signature;
pub use signature::Signature;
