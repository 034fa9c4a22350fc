//! Keygen command implementation.

use shp_keys::{KeyId, PrivateKeyMaterial, SignatureAlgorithm};

pub fn run(
    algorithm: String,
    key_id: String,
    out: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let algorithm = SignatureAlgorithm::parse(&algorithm)
        .ok_or_else(|| format!("Unknown algorithm: {}", algorithm))?;
    let key_id = KeyId::parse(key_id).map_err(|e| format!("Invalid key id: {}", e))?;

    let private = PrivateKeyMaterial::generate(algorithm)?;
    let public = private.public();

    std::fs::create_dir_all(&out)?;
    let key_path = std::path::Path::new(&out).join(format!("{}.key", key_id));
    let pub_path = std::path::Path::new(&out).join(format!("{}.pub", key_id));
    std::fs::write(&key_path, private.to_pkcs8_base64()?)?;
    std::fs::write(&pub_path, public.to_spki_base64()?)?;

    println!("Generated {} key pair '{}'", algorithm, key_id);
    println!("  private: {}", key_path.display());
    println!("  public:  {}", pub_path.display());
    Ok(())
}
