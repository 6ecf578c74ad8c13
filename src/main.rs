use textbook_rsa::{generate_keys, Cipher};

const DEMO_PRIME_BITS: u64 = 5;

fn main() -> textbook_rsa::Result<()> {
    let message = "Hello World!";
    println!("Message: {message}");

    let cipher = Cipher::from(generate_keys(DEMO_PRIME_BITS)?);

    let encrypted = cipher.encrypt_message(message);
    let listing: Vec<String> = encrypted.iter().map(ToString::to_string).collect();
    println!("Encrypted message: [{}]", listing.join(" "));

    let decrypted = cipher.decrypt_message_to_string(&encrypted)?;
    println!("Decrypted message: {decrypted}");
    Ok(())
}
