//! Username derivation at signup.

/// Usernames to try for a new account, in order of preference.
///
/// The local part of the email comes first. After it, the display name,
/// lower-cased with whitespace removed, followed by 1, 2, 3, ... The sequence
/// never ends, so callers stop at the first free candidate.
pub fn candidates(email: &str, name: &str) -> impl Iterator<Item = String> {
  let local = email.split('@').next().unwrap_or(email).to_owned();

  let base: String = name
    .to_lowercase()
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect();
  let base = if base.is_empty() { local.to_lowercase() } else { base };

  let first = (!local.is_empty()).then_some(local);
  first
    .into_iter()
    .chain((1u64..).map(move |n| format!("{base}{n}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn derive(email: &str, name: &str, taken: impl Fn(&str) -> bool) -> String {
    candidates(email, name).find(|c| !taken(c)).unwrap()
  }

  #[test]
  fn free_local_part_is_used() {
    assert_eq!(derive("ada@example.com", "Ada Lovelace", |_| false), "ada");
  }

  #[test]
  fn taken_local_part_falls_back_to_name_with_counter() {
    let taken = ["ada", "adalovelace1", "adalovelace2"];
    let got = derive("ada@example.com", "Ada Lovelace", |c| taken.contains(&c));
    assert_eq!(got, "adalovelace3");
  }

  #[test]
  fn candidates_start_with_local_part() {
    let first: Vec<_> = candidates("bob@example.com", "Bob B").take(3).collect();
    assert_eq!(first, ["bob", "bobb1", "bobb2"]);
  }

  #[test]
  fn blank_name_falls_back_to_local_part() {
    let got = derive("ada@example.com", "  ", |c| c == "ada");
    assert_eq!(got, "ada1");
  }
}
