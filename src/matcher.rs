//! The state machine that resolves request tuples against bound rules.
//!
//! Rules are inserted into a trie keyed on path segments: literal
//! segments share static edges, converter-driven segments become
//! dynamic edges ordered by specificity. Rules are referenced by index
//! into the map's rule vector. Traversal carries an explicit context
//! for the "would have matched another method" bookkeeping instead of
//! mutating captured state.

use {
    crate::{
        converters::Values,
        rule::{BoundRule, RulePart},
        util::collapse_slashes,
    },
    http::Method,
    indexmap::{IndexMap, IndexSet},
};

/// The matcher-level outcomes that are not a plain match. The adapter
/// turns these into public `MatchError` values with full URLs.
#[derive(Debug)]
pub(crate) enum Mismatch {
    NoMatch {
        allowed: IndexSet<Method>,
        websocket_mismatch: bool,
    },
    /// The canonical form of the path differs (trailing slash or merged
    /// slashes); the caller should redirect to it.
    RequestPath { path: String },
    /// An alias rule matched; the caller should redirect to the URL
    /// built from the canonical rule for this endpoint.
    AliasRedirect { endpoint: String, values: Values },
}

/// One node of the trie.
#[derive(Debug, Default)]
struct State {
    static_edges: IndexMap<String, State>,
    dynamic_edges: Vec<(RulePart, State)>,
    rules: Vec<usize>,
}

impl State {
    fn update(&mut self) {
        self.dynamic_edges
            .sort_by(|(a, _), (b, _)| a.weight.cmp(&b.weight));
        for state in self.static_edges.values_mut() {
            state.update();
        }
        for (_, state) in &mut self.dynamic_edges {
            state.update();
        }
    }
}

#[derive(Debug)]
pub(crate) struct Matcher {
    root: State,
    pub(crate) merge_slashes: bool,
    pub(crate) redirect_defaults: bool,
}

impl Matcher {
    pub(crate) fn new(merge_slashes: bool, redirect_defaults: bool) -> Self {
        Matcher {
            root: State::default(),
            merge_slashes,
            redirect_defaults,
        }
    }

    /// Inserts a bound rule, sharing existing edges where an equivalent
    /// part already sits at the same position. Dynamic edges are kept
    /// in weight order on insertion, so the trie is always consistent.
    pub(crate) fn add(&mut self, index: usize, rule: &BoundRule) {
        let mut state = &mut self.root;
        for part in &rule.parts {
            if part.is_static {
                state = state
                    .static_edges
                    .entry(part.content.clone())
                    .or_insert_with(State::default);
            } else {
                let position = match state
                    .dynamic_edges
                    .iter()
                    .position(|(existing, _)| existing.same_edge(part))
                {
                    Some(position) => position,
                    None => {
                        let position = state
                            .dynamic_edges
                            .iter()
                            .position(|(existing, _)| existing.weight > part.weight)
                            .unwrap_or_else(|| state.dynamic_edges.len());
                        state
                            .dynamic_edges
                            .insert(position, (part.clone(), State::default()));
                        position
                    }
                };
                state = &mut state.dynamic_edges[position].1;
            }
        }
        state.rules.push(index);
    }

    /// Re-sorts every node's dynamic edges by specificity. Idempotent;
    /// insertion already maintains the order, so this is cheap.
    pub(crate) fn update(&mut self) {
        self.root.update();
    }

    /// Resolves `(domain, path, method, websocket)` to a rule index and
    /// its converted values.
    pub(crate) fn match_path(
        &self,
        rules: &[BoundRule],
        domain: &str,
        path: &str,
        method: &Method,
        websocket: bool,
    ) -> Result<(usize, Values), Mismatch> {
        let mut context = MatchContext {
            rules,
            method,
            websocket,
            have_match_for: IndexSet::new(),
            websocket_mismatch: false,
        };

        let parts: Vec<&str> = Some(domain).into_iter().chain(path.split('/')).collect();
        let mut raw_values = Vec::new();
        let hit = match context.traverse(&self.root, &parts, &mut raw_values) {
            Err(SlashRequired) => {
                return Err(Mismatch::RequestPath {
                    path: format!("{}/", path),
                });
            }
            Ok(hit) => hit,
        };

        let index = match hit {
            Some(index) => index,
            None => {
                if !self.merge_slashes || !path.contains("//") {
                    return Err(context.into_no_match());
                }

                // one bounded retry against the collapsed path; a hit is
                // reported as a redirect so the canonical URL stays
                // singular
                let merged = collapse_slashes(path);
                log::trace!("retrying {:?} with merged slashes as {:?}", path, merged);
                let parts: Vec<&str> =
                    Some(domain).into_iter().chain(merged.split('/')).collect();
                let mut merged_values = Vec::new();
                match context.traverse(&self.root, &parts, &mut merged_values) {
                    Err(SlashRequired) => {
                        return Err(Mismatch::RequestPath {
                            path: format!("{}/", merged),
                        });
                    }
                    Ok(Some(index)) if rules[index].merge_slashes => {
                        return Err(Mismatch::RequestPath { path: merged });
                    }
                    _ => return Err(context.into_no_match()),
                }
            }
        };

        let rule = &rules[index];
        let mut values = Values::new();
        for (name, raw) in raw_values {
            let converter = rule
                .converters
                .get(&name)
                .expect("every captured variable has a converter");
            match converter.to_value(&raw) {
                Ok(value) => {
                    values.insert(name, value);
                }
                Err(..) => return Err(context.into_no_match()),
            }
        }
        if let Some(defaults) = &rule.rule.defaults {
            for (name, value) in defaults {
                values.insert(name.clone(), value.clone());
            }
        }

        if rule.rule.alias && self.redirect_defaults {
            return Err(Mismatch::AliasRedirect {
                endpoint: rule.rule.endpoint.clone(),
                values,
            });
        }

        Ok((index, values))
    }
}

/// Raised while traversing when the only match sits behind a trailing
/// slash on a strict rule.
struct SlashRequired;

const TRAILING: &[&str] = &[""];

struct MatchContext<'a> {
    rules: &'a [BoundRule],
    method: &'a Method,
    websocket: bool,
    have_match_for: IndexSet<Method>,
    websocket_mismatch: bool,
}

impl<'a> MatchContext<'a> {
    fn traverse(
        &mut self,
        state: &State,
        parts: &[&str],
        values: &mut Vec<(String, String)>,
    ) -> Result<Option<usize>, SlashRequired> {
        if parts.is_empty() {
            for &index in &state.rules {
                if self.check_rule(index) {
                    return Ok(Some(index));
                }
            }

            // a sibling trailing-slash state decides between redirecting
            // and matching without the slash
            if let Some(slashed) = state.static_edges.get("") {
                for &index in &slashed.rules {
                    let rule = &self.rules[index];
                    if rule.rule.websocket == self.websocket && rule.allows(self.method) {
                        if rule.strict_slashes {
                            return Err(SlashRequired);
                        }
                        return Ok(Some(index));
                    }
                }
            }
            return Ok(None);
        }

        let part = parts[0];
        if let Some(child) = state.static_edges.get(part) {
            if let Some(index) = self.traverse(child, &parts[1..], values)? {
                return Ok(Some(index));
            }
        }

        for (dynamic, child) in &state.dynamic_edges {
            let joined;
            let (target, rest): (&str, &[&str]) = if dynamic.is_final {
                joined = parts.join("/");
                (joined.as_str(), &[])
            } else {
                (part, &parts[1..])
            };

            let regex = dynamic
                .regex
                .as_ref()
                .expect("dynamic parts always carry a compiled regex");
            if let Some(captures) = regex.captures(target) {
                let mut rest = rest;
                if dynamic.suffixed
                    && captures.name("__suffix__").map_or(false, |m| m.as_str() == "/")
                {
                    rest = TRAILING;
                }

                let checkpoint = values.len();
                for name in &dynamic.names {
                    let raw = captures
                        .name(name)
                        .map_or("", |m| m.as_str())
                        .to_owned();
                    values.push((name.clone(), raw));
                }
                if let Some(index) = self.traverse(child, rest, values)? {
                    return Ok(Some(index));
                }
                values.truncate(checkpoint);
            }
        }

        // a lone trailing empty segment also matches rules that do not
        // insist on the slash distinction
        if parts.len() == 1 && parts[0].is_empty() {
            for &index in &state.rules {
                if self.rules[index].strict_slashes {
                    continue;
                }
                if self.check_rule(index) {
                    return Ok(Some(index));
                }
            }
        }

        Ok(None)
    }

    fn check_rule(&mut self, index: usize) -> bool {
        let rule = &self.rules[index];
        if let Some(methods) = &rule.methods {
            if !methods.contains(self.method) {
                self.have_match_for.extend(methods.iter().cloned());
                return false;
            }
        }
        if rule.rule.websocket != self.websocket {
            self.websocket_mismatch = true;
            return false;
        }
        true
    }

    fn into_no_match(self) -> Mismatch {
        Mismatch::NoMatch {
            allowed: self.have_match_for,
            websocket_mismatch: self.websocket_mismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{converters::default_converters, map::MapConfig, rule::Rule, Value},
        matches::assert_matches,
    };

    fn build_matcher(rules: Vec<Rule>) -> (Matcher, Vec<BoundRule>) {
        let config = MapConfig::default();
        let registry = default_converters();
        let mut matcher = Matcher::new(true, true);
        let bound: Vec<BoundRule> = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| BoundRule::bind(rule, index, &config, &registry).unwrap())
            .collect();
        for (index, rule) in bound.iter().enumerate() {
            matcher.add(index, rule);
        }
        matcher.update();
        (matcher, bound)
    }

    #[test]
    fn static_beats_dynamic_regardless_of_order() {
        let (matcher, rules) = build_matcher(vec![
            Rule::new("/<name>", "dynamic"),
            Rule::new("/fixed", "static"),
        ]);

        let (index, values) = matcher
            .match_path(&rules, "", "/fixed", &Method::GET, false)
            .unwrap();
        assert_eq!(rules[index].rule.endpoint(), "static");
        assert!(values.is_empty());

        let (index, values) = matcher
            .match_path(&rules, "", "/other", &Method::GET, false)
            .unwrap();
        assert_eq!(rules[index].rule.endpoint(), "dynamic");
        assert_eq!(values.get("name"), Some(&Value::from("other")));
    }

    #[test]
    fn stricter_converters_win() {
        let (matcher, rules) = build_matcher(vec![
            Rule::new("/<name>", "string"),
            Rule::new("/<int:id>", "int"),
        ]);

        let (index, _) = matcher
            .match_path(&rules, "", "/42", &Method::GET, false)
            .unwrap();
        assert_eq!(rules[index].rule.endpoint(), "int");

        let (index, _) = matcher
            .match_path(&rules, "", "/abc", &Method::GET, false)
            .unwrap();
        assert_eq!(rules[index].rule.endpoint(), "string");
    }

    #[test]
    fn trailing_slash_requires_redirect() {
        let (matcher, rules) = build_matcher(vec![Rule::new("/foo/", "foo")]);

        assert_matches!(
            matcher.match_path(&rules, "", "/foo", &Method::GET, false),
            Err(Mismatch::RequestPath { ref path }) if path == "/foo/"
        );
        assert!(matcher
            .match_path(&rules, "", "/foo/", &Method::GET, false)
            .is_ok());
    }

    #[test]
    fn non_strict_rules_match_either_form() {
        let (matcher, rules) = build_matcher(vec![
            Rule::new("/lenient/", "branch").strict_slashes(false),
            Rule::new("/leaf", "leaf").strict_slashes(false),
        ]);

        for path in &["/lenient", "/lenient/"] {
            let (index, _) = matcher
                .match_path(&rules, "", path, &Method::GET, false)
                .unwrap();
            assert_eq!(rules[index].rule.endpoint(), "branch");
        }
        for path in &["/leaf", "/leaf/"] {
            let (index, _) = matcher
                .match_path(&rules, "", path, &Method::GET, false)
                .unwrap();
            assert_eq!(rules[index].rule.endpoint(), "leaf");
        }
    }

    #[test]
    fn merged_slashes_redirect_instead_of_matching() {
        let (matcher, rules) = build_matcher(vec![Rule::new("/foo/bar", "foo")]);

        assert_matches!(
            matcher.match_path(&rules, "", "//foo//bar", &Method::GET, false),
            Err(Mismatch::RequestPath { ref path }) if path == "/foo/bar"
        );
    }

    #[test]
    fn merge_opt_out_requires_the_doubled_form() {
        let (matcher, rules) =
            build_matcher(vec![Rule::new("/yes//no", "strange").merge_slashes(false)]);

        assert!(matcher
            .match_path(&rules, "", "/yes//no", &Method::GET, false)
            .is_ok());
        assert_matches!(
            matcher.match_path(&rules, "", "/yes/no", &Method::GET, false),
            Err(Mismatch::NoMatch { .. })
        );
    }

    #[test]
    fn method_union_is_accumulated() {
        let (matcher, rules) = build_matcher(vec![
            Rule::new("/resource", "get").methods(&["GET"]),
            Rule::new("/resource", "post").methods(&["POST"]),
        ]);

        match matcher.match_path(&rules, "", "/resource", &Method::DELETE, false) {
            Err(Mismatch::NoMatch {
                allowed,
                websocket_mismatch,
            }) => {
                assert!(!websocket_mismatch);
                let mut allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
                allowed.sort();
                assert_eq!(allowed, ["GET", "HEAD", "POST"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn websocket_mismatch_is_flagged() {
        let (matcher, rules) = build_matcher(vec![Rule::new("/ws", "ws").websocket(true)]);

        assert_matches!(
            matcher.match_path(&rules, "", "/ws", &Method::GET, false),
            Err(Mismatch::NoMatch {
                websocket_mismatch: true,
                ..
            })
        );
        assert!(matcher
            .match_path(&rules, "", "/ws", &Method::GET, true)
            .is_ok());
    }

    #[test]
    fn final_part_consumes_remaining_segments() {
        let (matcher, rules) = build_matcher(vec![Rule::new("/files/<path:name>", "files")]);

        let (_, values) = matcher
            .match_path(&rules, "", "/files/dir/readme.txt", &Method::GET, false)
            .unwrap();
        assert_eq!(values.get("name"), Some(&Value::from("dir/readme.txt")));
    }

    #[test]
    fn alias_rules_signal_a_redirect() {
        let (matcher, rules) = build_matcher(vec![
            Rule::new("/", "index"),
            Rule::new("/index.html", "index").alias(true),
        ]);

        assert_matches!(
            matcher.match_path(&rules, "", "/index.html", &Method::GET, false),
            Err(Mismatch::AliasRedirect { ref endpoint, .. }) if endpoint == "index"
        );
    }

    #[test]
    fn domains_partition_the_trie() {
        let (matcher, rules) = build_matcher(vec![
            Rule::new("/", "plain"),
            Rule::new("/", "kb").subdomain("kb"),
        ]);

        let (index, _) = matcher
            .match_path(&rules, "", "/", &Method::GET, false)
            .unwrap();
        assert_eq!(rules[index].rule.endpoint(), "plain");

        let (index, _) = matcher
            .match_path(&rules, "kb", "/", &Method::GET, false)
            .unwrap();
        assert_eq!(rules[index].rule.endpoint(), "kb");

        assert_matches!(
            matcher.match_path(&rules, "other", "/", &Method::GET, false),
            Err(Mismatch::NoMatch { .. })
        );
    }

    #[test]
    fn conversion_failure_falls_back_to_not_found() {
        let (matcher, rules) =
            build_matcher(vec![Rule::new("/page/<int(max=5):page>", "page")]);

        assert!(matcher
            .match_path(&rules, "", "/page/5", &Method::GET, false)
            .is_ok());
        assert_matches!(
            matcher.match_path(&rules, "", "/page/6", &Method::GET, false),
            Err(Mismatch::NoMatch { .. })
        );
    }
}
