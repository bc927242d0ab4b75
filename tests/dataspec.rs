// ABOUTME: Integration tests for DataSpec overlays on array-encoded objects.
// ABOUTME: Decodes a vault-style fixture in both array and map form into the same typed structure.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use msgpack_dataspec::{from_slice, from_slice_with_dataspec, DataSpec, DecoderConfig, Deserializer, Error};
use serde::Deserialize;
use std::collections::HashMap;

/// Top-level object with positions `[b, c, envData, ciphers]`.
const ARRAY_ENCODED: &str = concat!(
    "lK50ZXN0aW5nIHN0cmluZyeSpnF3ZXF3ZagxMjNpY29uc5OU2SRlMTZkYTYwMi0zMjE1LTRiZDYtYjY5MC00Y2Q4",
    "NmEwZmU3NjSoQ2lwaGVyIDEBk61jaXBodXNlcm5hbWUxrWFkZmFmZHcyMzQxMzGSkblodHRwczovL3d3dy5nb29n",
    "bGUuY29tLmFykbVodHRwczovL3d3dy5hcHBsZS5jb22U2SRhNjExMWU2Ny1hMTMwLTRiM2ItODM5NS0xZjIzMDFj",
    "Njk3ZjeoQ2lwaGVyIDIBk6g0MzEzMjEzMatqbGpsbHl1bHVpecCU2SRiOGIwODM3MC0xNGU0LTQzZmUtYjBkOS04",
    "ZjJlMDlmODJkYzWoQ2lwaGVyIDMBk6twaW9waW9waXBpb6x6eGN6eHZ6eHZ4enaSkbdodHRwczovL3d3dy52aXNh",
    "LmNvbS5hcpG1aHR0cHM6Ly93d3cuZG9ja3MuY29t",
);

/// The same document with every object map-encoded.
const MAP_ENCODED: &str = concat!(
    "hKFirnRlc3Rpbmcgc3RyaW5noWMnp2VudkRhdGGCpGJhc2WmcXdlcXdlpWljb25zqDEyM2ljb25zp2NpcGhlcnOT",
    "hKJpZNkkMDA4YmE0NDctZjU0Mi00OWVjLWJjYTktMDMzZTQ2OTU0YTBipG5hbWWoQ2lwaGVyIDGkdHlwZQGlbG9n",
    "aW6DqHVzZXJuYW1lrWNpcGh1c2VybmFtZTGkdG90cK1hZGZhZmR3MjM0MTMxpHVyaXOSgaN1cmm5aHR0cHM6Ly93",
    "d3cuZ29vZ2xlLmNvbS5hcoGjdXJptWh0dHBzOi8vd3d3LmFwcGxlLmNvbYSiaWTZJDQ1ZTBhODJiLTgyZGQtNDJi",
    "Zi05ODhhLTAyYTkyNGM4Yzg5M6RuYW1lqENpcGhlciAypHR5cGUBpWxvZ2lug6h1c2VybmFtZag0MzEzMjEzMaR0",
    "b3Rwq2psamxseXVsdWl5pHVyaXPAhKJpZNkkZTBjZWU5NDEtZDI1Ni00MjdiLWJkNWUtNDMxMmMwN2U1NDI5pG5h",
    "bWWoQ2lwaGVyIDOkdHlwZQGlbG9naW6DqHVzZXJuYW1lq3Bpb3Bpb3BpcGlvpHRvdHCsenhjenh2enh2eHp2pHVy",
    "aXOSgaN1cmm3aHR0cHM6Ly93d3cudmlzYS5jb20uYXKBo3VyabVodHRwczovL3d3dy5kb2Nrcy5jb20=",
);

#[derive(Debug, Deserialize, PartialEq)]
struct Vault {
    b: String,
    c: i64,
    #[serde(rename = "envData")]
    env_data: EnvironmentUrls,
    ciphers: Option<Vec<Cipher>>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct EnvironmentUrls {
    base: Option<String>,
    icons: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Cipher {
    id: String,
    name: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    login: Login,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Login {
    username: Option<String>,
    totp: Option<String>,
    uris: Option<Vec<LoginUri>>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct LoginUri {
    uri: Option<String>,
}

fn vault_spec() -> DataSpec {
    DataSpec::builder()
        .field("b")
        .field("c")
        .object("envData", DataSpec::from_names(["base", "icons"]))
        .array(
            "ciphers",
            DataSpec::builder()
                .field("id")
                .field("name")
                .field("type")
                .object(
                    "login",
                    DataSpec::builder()
                        .field("username")
                        .field("totp")
                        .array("uris", DataSpec::from_names(["uri"]))
                        .build(),
                )
                .build(),
        )
        .build()
}

fn fixture(b64: &str) -> Vec<u8> {
    STANDARD.decode(b64).unwrap()
}

fn uris(cipher: &Cipher) -> Vec<&str> {
    cipher
        .login
        .uris
        .iter()
        .flatten()
        .filter_map(|u| u.uri.as_deref())
        .collect()
}

#[test]
fn test_array_encoded_vault() {
    let bytes = fixture(ARRAY_ENCODED);
    let vault: Vault = from_slice_with_dataspec(&bytes, DecoderConfig::default(), &vault_spec()).unwrap();

    assert_eq!(vault.b, "testing string");
    assert_eq!(vault.c, 39);
    assert_eq!(vault.env_data.base.as_deref(), Some("qweqwe"));
    assert_eq!(vault.env_data.icons.as_deref(), Some("123icons"));

    let ciphers = vault.ciphers.as_ref().unwrap();
    assert_eq!(ciphers.len(), 3);
    assert_eq!(ciphers[0].name.as_deref(), Some("Cipher 1"));
    assert_eq!(ciphers[0].user_id, None);
    assert_eq!(ciphers[0].login.username.as_deref(), Some("ciphusername1"));
    assert_eq!(uris(&ciphers[0]), ["https://www.google.com.ar", "https://www.apple.com"]);
    assert_eq!(ciphers[1].login.totp.as_deref(), Some("jljllyuluiy"));
    assert!(ciphers[1].login.uris.is_none());
    assert_eq!(uris(&ciphers[2]), ["https://www.visa.com.ar", "https://www.docks.com"]);
}

#[test]
fn test_map_encoded_vault_ignores_dataspec() {
    let bytes = fixture(MAP_ENCODED);
    let plain: Vault = from_slice(&bytes).unwrap();
    let overlaid: Vault = from_slice_with_dataspec(&bytes, DecoderConfig::default(), &vault_spec()).unwrap();
    assert_eq!(plain, overlaid);

    assert_eq!(plain.b, "testing string");
    let ciphers = plain.ciphers.as_ref().unwrap();
    assert_eq!(ciphers.len(), 3);
    assert_eq!(ciphers[0].id, "008ba447-f542-49ec-bca9-033e46954a0b");
    assert_eq!(uris(&ciphers[2]), ["https://www.visa.com.ar", "https://www.docks.com"]);
}

#[test]
fn test_both_encodings_agree_on_content() {
    let from_array: Vault =
        from_slice_with_dataspec(&fixture(ARRAY_ENCODED), DecoderConfig::default(), &vault_spec()).unwrap();
    let from_map: Vault = from_slice(&fixture(MAP_ENCODED)).unwrap();

    assert_eq!(from_array.b, from_map.b);
    assert_eq!(from_array.env_data, from_map.env_data);
    let (a, m) = (from_array.ciphers.unwrap(), from_map.ciphers.unwrap());
    for (x, y) in a.iter().zip(&m) {
        assert_eq!(x.name, y.name);
        assert_eq!(x.login, y.login);
    }
}

#[test]
fn test_short_array_leaves_trailing_fields_absent() {
    #[derive(Debug, Deserialize)]
    struct Named {
        #[allow(dead_code)]
        name: String,
        #[allow(dead_code)]
        age: u8,
    }

    let spec = DataSpec::from_names(["name", "age"]);
    // ["x"]
    let err = from_slice_with_dataspec::<Named>(&[0x91, 0xa1, b'x'], DecoderConfig::default(), &spec).unwrap_err();
    assert!(matches!(err, Error::KeyNotFound { ref key, .. } if key == "age"));
}

#[test]
fn test_extra_positions_are_skipped() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct First {
        a: u8,
    }

    let spec = DataSpec::from_names(["a"]);
    // [1, [2, 3], {"k": 4}]
    let bytes = [0x93, 0x01, 0x92, 0x02, 0x03, 0x81, 0xa1, b'k', 0x04];
    let value: First = from_slice_with_dataspec(&bytes, DecoderConfig::default(), &spec).unwrap();
    assert_eq!(value, First { a: 1 });
}

#[test]
fn test_nested_error_path_uses_field_names() {
    #[derive(Debug, Deserialize)]
    struct StrictLogin {
        #[allow(dead_code)]
        username: u32,
    }
    #[derive(Debug, Deserialize)]
    struct StrictCipher {
        #[allow(dead_code)]
        login: StrictLogin,
    }
    #[derive(Debug, Deserialize)]
    struct StrictVault {
        #[allow(dead_code)]
        ciphers: Vec<StrictCipher>,
    }

    let bytes = fixture(ARRAY_ENCODED);
    let err = from_slice_with_dataspec::<StrictVault>(&bytes, DecoderConfig::default(), &vault_spec()).unwrap_err();
    assert_eq!(err.error_type(), "type_mismatch");
    assert_eq!(err.path().to_string(), "ciphers[0].login.username");
}

#[test]
fn test_root_element_dataspec() {
    // [["a"], ["b"]]
    let bytes = [0x92, 0x91, 0xa1, b'a', 0x91, 0xa1, b'b'];
    let spec = DataSpec::from_names(["uri"]);
    let mut de = Deserializer::from_slice(&bytes).with_element_dataspec(&spec);
    let list = Vec::<LoginUri>::deserialize(&mut de).unwrap();
    de.end().unwrap();
    assert_eq!(
        list,
        vec![
            LoginUri { uri: Some("a".into()) },
            LoginUri { uri: Some("b".into()) },
        ]
    );
}

#[test]
fn test_array_without_dataspec_decodes_positionally() {
    // ["qweqwe", "123icons"]
    let bytes = [
        0x92, 0xa6, b'q', b'w', b'e', b'q', b'w', b'e', 0xa8, b'1', b'2', b'3', b'i', b'c', b'o', b'n', b's',
    ];
    let env: EnvironmentUrls = from_slice(&bytes).unwrap();
    assert_eq!(env.base.as_deref(), Some("qweqwe"));
    assert_eq!(env.icons.as_deref(), Some("123icons"));
}

#[test]
fn test_array_child_of_map_parent_is_relabeled() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Partial {
        #[serde(rename = "envData")]
        env_data: EnvironmentUrls,
    }

    // {"envData": ["qweqwe", "123icons"]}
    let mut bytes = vec![0x81, 0xa7];
    bytes.extend_from_slice(b"envData");
    bytes.extend_from_slice(&[0x92, 0xa6]);
    bytes.extend_from_slice(b"qweqwe");
    bytes.push(0xa8);
    bytes.extend_from_slice(b"123icons");

    let partial: Partial = from_slice_with_dataspec(&bytes, DecoderConfig::default(), &vault_spec()).unwrap();
    assert_eq!(partial.env_data.base.as_deref(), Some("qweqwe"));
    assert_eq!(partial.env_data.icons.as_deref(), Some("123icons"));

    // Keyed targets only see field names through the overlay
    let keyed: HashMap<String, HashMap<String, String>> =
        from_slice_with_dataspec(&bytes, DecoderConfig::default(), &vault_spec()).unwrap();
    assert_eq!(keyed["envData"]["base"], "qweqwe");
    assert_eq!(keyed["envData"]["icons"], "123icons");
    assert!(from_slice::<HashMap<String, HashMap<String, String>>>(&bytes).is_err());
}
