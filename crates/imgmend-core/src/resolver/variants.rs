//! Rewriting of `srcset`-style variant lists.

use crate::address::{Address, AddressParser};

/// Point every entry served by `from`'s server at `to`'s server instead.
///
/// Entries are `url [descriptor]`, comma separated. Each entry keeps its own
/// path and descriptor; entries on other servers are left alone.
pub fn rewrite_variants(parser: &AddressParser, variants: &str, from: &Address, to: &Address) -> String {
    let from_host = from.host_cluster();
    variants
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (url, descriptor) = match entry.split_once(char::is_whitespace) {
                Some((url, rest)) => (url, Some(rest.trim())),
                None => (entry, None),
            };
            let rewritten = match parser.parse(url) {
                Some(a) if a.host_cluster() == from_host => to.with_path(&a.path).render(),
                _ => url.to_string(),
            };
            match descriptor {
                Some(d) if !d.is_empty() => format!("{rewritten} {d}"),
                _ => rewritten,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostFamilyConfig;

    fn setup() -> (AddressParser, Address, Address) {
        let p = AddressParser::new(&HostFamilyConfig::default()).unwrap();
        let from = p.parse("https://k03.mbdny.org/a/1.jpg").unwrap();
        let to = p.parse("https://n05.mbcdns.org/a/1.jpg").unwrap();
        (p, from, to)
    }

    #[test]
    fn rewrites_matching_entries_keeping_descriptors() {
        let (p, from, to) = setup();
        let out = rewrite_variants(
            &p,
            "https://k03.mbdny.org/a/1.jpg 1x, https://k03.mbdny.org/a/1@2.jpg 2x",
            &from,
            &to,
        );
        assert_eq!(
            out,
            "https://n05.mbcdns.org/a/1.jpg 1x, https://n05.mbcdns.org/a/1@2.jpg 2x"
        );
    }

    #[test]
    fn leaves_other_servers_untouched() {
        let (p, from, to) = setup();
        let out = rewrite_variants(
            &p,
            "https://k04.mbdny.org/a/1.jpg 1x,https://cdn.example.com/1.jpg 2x",
            &from,
            &to,
        );
        assert_eq!(
            out,
            "https://k04.mbdny.org/a/1.jpg 1x, https://cdn.example.com/1.jpg 2x"
        );
    }

    #[test]
    fn bare_urls_and_empty_entries() {
        let (p, from, to) = setup();
        assert_eq!(
            rewrite_variants(&p, "https://k03.mbdny.org/b.jpg,, ", &from, &to),
            "https://n05.mbcdns.org/b.jpg"
        );
        assert_eq!(rewrite_variants(&p, "", &from, &to), "");
    }
}
