//! Robots.txt parser implementation
//!
//! Splits a robots.txt document into ordered allow/disallow rules for one
//! user agent. Rules addressed to that agent come first, followed by the
//! rules of the `User-agent: *` section; each partition keeps the document's
//! line order. Rules of any other agent are dropped.

use crate::robots::pattern::RulePattern;

const GLOBAL_USER_AGENT: &str = "*";

/// A single allow/disallow directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    /// Pattern matched against the full URL
    pub pattern: RulePattern,

    /// True for `Allow`, false for `Disallow`
    pub allowed: bool,
}

impl RobotsRule {
    pub fn allow(pattern: &str) -> Self {
        Self {
            pattern: RulePattern::new(pattern),
            allowed: true,
        }
    }

    pub fn disallow(pattern: &str) -> Self {
        Self {
            pattern: RulePattern::new(pattern),
            allowed: false,
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        self.pattern.matches(url)
    }
}

/// Parses robots.txt content into the ordered rule list for `user_agent`
///
/// Lines that are neither `User-agent`, `Allow` nor `Disallow` directives are
/// skipped, as are directives with an empty pattern.
///
/// # Example
///
/// ```
/// use quatermain::robots::parse_rules;
///
/// let rules = parse_rules("User-agent: *\nDisallow: /private", "quatermain");
/// assert_eq!(rules.len(), 1);
/// assert!(!rules[0].allowed);
/// ```
pub fn parse_rules(content: &str, user_agent: &str) -> Vec<RobotsRule> {
    let mut agent_rules = Vec::new();
    let mut global_rules = Vec::new();
    let mut section = GLOBAL_USER_AGENT.to_string();

    for line in content.lines() {
        let line = strip_comment(line).trim();

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        let build: fn(&str) -> RobotsRule = match key.trim().to_ascii_lowercase().as_str() {
            "user-agent" => {
                section = value.to_string();
                continue;
            }
            "allow" => RobotsRule::allow,
            "disallow" => RobotsRule::disallow,
            _ => continue,
        };

        if value.is_empty() {
            continue;
        }

        let rule = build(value);

        if section == GLOBAL_USER_AGENT {
            global_rules.push(rule);
        } else if section.eq_ignore_ascii_case(user_agent) {
            agent_rules.push(rule);
        } else {
            tracing::trace!("Ignoring robots.txt rule for agent {}", section);
        }
    }

    agent_rules.extend(global_rules);
    agent_rules
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(rules: &[RobotsRule]) -> Vec<(&str, bool)> {
        rules
            .iter()
            .map(|rule| (rule.pattern.as_str(), rule.allowed))
            .collect()
    }

    #[test]
    fn test_parse_global_section() {
        let rules = parse_rules("User-agent: *\nDisallow: /admin\nAllow: /admin/public", "TestBot");
        assert_eq!(
            patterns(&rules),
            vec![("/admin", false), ("/admin/public", true)]
        );
    }

    #[test]
    fn test_rules_before_any_user_agent_are_global() {
        let rules = parse_rules("Disallow: /tmp\n", "TestBot");
        assert_eq!(patterns(&rules), vec![("/tmp", false)]);
    }

    #[test]
    fn test_rule_constructors() {
        let allow = RobotsRule::allow("/docs/*.html$");
        assert!(allow.allowed);
        assert!(allow.matches("https://example.com/docs/intro.html"));
        assert!(!allow.matches("https://example.com/docs/intro.html?x=1"));

        let disallow = RobotsRule::disallow("/tmp");
        assert!(!disallow.allowed);
        assert!(disallow.matches("https://example.com/tmp/file"));
    }

    #[test]
    fn test_agent_rules_come_before_global_rules() {
        let content = concat!(
            "User-agent: *\nDisallow: /global\n\n",
            "User-agent: TestBot\nAllow: /mine\nDisallow: /theirs",
        );
        let rules = parse_rules(content, "TestBot");
        assert_eq!(
            patterns(&rules),
            vec![("/mine", true), ("/theirs", false), ("/global", false)]
        );
    }

    #[test]
    fn test_other_agents_ignored() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nDisallow: /private";
        let rules = parse_rules(content, "TestBot");
        assert_eq!(patterns(&rules), vec![("/private", false)]);
    }

    #[test]
    fn test_agent_name_case_insensitive() {
        let rules = parse_rules("User-agent: testbot\nDisallow: /x", "TestBot");
        assert_eq!(patterns(&rules), vec![("/x", false)]);
    }

    #[test]
    fn test_empty_pattern_skipped() {
        let rules = parse_rules("User-agent: *\nDisallow:\nAllow:   \nDisallow: /a", "TestBot");
        assert_eq!(patterns(&rules), vec![("/a", false)]);
    }

    #[test]
    fn test_unknown_and_malformed_lines_skipped() {
        let content = concat!(
            "User-agent: *\n",
            "Crawl-delay: 10\n",
            "Sitemap: https://example.com/sitemap.xml\n",
            "this is garbage\n",
            "Disallow: /a",
        );
        let rules = parse_rules(content, "TestBot");
        assert_eq!(patterns(&rules), vec![("/a", false)]);
    }

    #[test]
    fn test_comments_stripped() {
        let content =
            "# robots for example.com\nUser-agent: * # everyone\nDisallow: /cgi-bin # scripts";
        let rules = parse_rules(content, "TestBot");
        assert_eq!(patterns(&rules), vec![("/cgi-bin", false)]);
    }

    #[test]
    fn test_pattern_keeps_colons() {
        let rules = parse_rules("User-agent: *\nDisallow: /a:b", "TestBot");
        assert_eq!(patterns(&rules), vec![("/a:b", false)]);
    }

    #[test]
    fn test_lowercase_directives() {
        let rules = parse_rules("user-agent: *\ndisallow: /a\nallow: /a/b", "TestBot");
        assert_eq!(patterns(&rules), vec![("/a", false), ("/a/b", true)]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rules = parse_rules("User-agent: *\r\nDisallow: /a\r\n", "TestBot");
        assert_eq!(patterns(&rules), vec![("/a", false)]);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_rules("", "TestBot").is_empty());
    }
}
