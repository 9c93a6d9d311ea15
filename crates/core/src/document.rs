//! Markdown block extractor.
//!
//! Scans a literate document line by line and yields its code blocks:
//! fenced blocks (three or more backticks or tildes, optional language
//! tag) and indented blocks (four spaces or a tab, after a blank line).
//! Untagged blocks are LambdaScript.

use serde::Serialize;

/// Language tag given to indented and untagged fenced blocks.
pub const DEFAULT_LANG: &str = "lambdascript";

/// A code block of a document. Line numbers are 1-based and inclusive;
/// for fenced blocks they cover the fence lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub text: String,
    pub lang: String,
    pub start_line: u32,
    pub end_line: u32,
}

enum State {
    Text { last_empty: bool },
    Indented,
    Fenced { fence: String },
}

/// Streaming iterator over the fragments of a document.
pub struct Fragments<'a> {
    lines: std::str::SplitInclusive<'a, char>,
    line_no: u32,
    state: State,
    block: String,
    lang: String,
    start: u32,
    /// A line that closed an indented block and must be looked at again
    pending: Option<&'a str>,
}

pub fn fragments(text: &str) -> Fragments<'_> {
    Fragments {
        lines: text.split_inclusive('\n'),
        line_no: 0,
        state: State::Text { last_empty: true },
        block: String::new(),
        lang: String::new(),
        start: 0,
        pending: None,
    }
}

fn is_empty_line(l: &str) -> bool {
    l.trim().is_empty()
}

fn is_code_line(l: &str) -> bool {
    l.starts_with("    ") || l.starts_with('\t')
}

/// Fence string and language tag of an opening fence line. A fence is a
/// run of three or more of the same character, backtick or tilde.
fn parse_fence(l: &str) -> Option<(String, String)> {
    let marker = l.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let fence: String = l.chars().take_while(|c| *c == marker).collect();
    if fence.len() < 3 {
        return None;
    }
    let rest = l[fence.len()..].trim_start();
    let lang: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '`')
        .collect();
    let lang = if lang.is_empty() {
        DEFAULT_LANG.to_owned()
    } else {
        lang
    };
    Some((fence, lang))
}

impl Fragments<'_> {
    fn emit(&mut self, end_line: u32) -> Fragment {
        Fragment {
            text: std::mem::take(&mut self.block),
            lang: std::mem::take(&mut self.lang),
            start_line: self.start,
            end_line,
        }
    }
}

impl Iterator for Fragments<'_> {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        loop {
            let line = match self.pending.take() {
                Some(l) => l,
                None => match self.lines.next() {
                    Some(l) => {
                        self.line_no += 1;
                        l
                    }
                    None => {
                        // End of document closes whatever is open
                        return match self.state {
                            State::Text { .. } => None,
                            State::Indented | State::Fenced { .. } => {
                                self.state = State::Text { last_empty: true };
                                Some(self.emit(self.line_no))
                            }
                        };
                    }
                },
            };

            match &self.state {
                State::Fenced { fence } => {
                    if line.starts_with(fence.as_str()) {
                        self.state = State::Text { last_empty: true };
                        return Some(self.emit(self.line_no));
                    }
                    self.block.push_str(line);
                }
                State::Indented => {
                    if is_code_line(line) || is_empty_line(line) {
                        self.block.push_str(line);
                    } else {
                        self.state = State::Text { last_empty: false };
                        self.pending = Some(line);
                        return Some(self.emit(self.line_no - 1));
                    }
                }
                State::Text { last_empty } => {
                    if *last_empty && is_code_line(line) {
                        self.state = State::Indented;
                        self.lang = DEFAULT_LANG.to_owned();
                        self.block = line.to_owned();
                        self.start = self.line_no;
                    } else if let Some((fence, lang)) = parse_fence(line) {
                        self.state = State::Fenced { fence };
                        self.lang = lang;
                        self.block.clear();
                        self.start = self.line_no;
                    } else {
                        self.state = State::Text {
                            last_empty: is_empty_line(line),
                        };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fenced_blocks_with_and_without_tags() {
        let doc = "# Title\n\n```\na: 1\n```\n\ntext\n~~~python\nx = 1\n~~~\n";
        let frags: Vec<_> = fragments(doc).collect();
        assert_eq!(
            frags,
            vec![
                Fragment {
                    text: "a: 1\n".into(),
                    lang: "lambdascript".into(),
                    start_line: 3,
                    end_line: 5,
                },
                Fragment {
                    text: "x = 1\n".into(),
                    lang: "python".into(),
                    start_line: 8,
                    end_line: 10,
                },
            ]
        );
    }

    #[test]
    fn indented_block_needs_a_blank_line_before_it() {
        let doc = "para\n    not code\n\n    a: 1,\n\n    b: 2\nafter\n";
        let frags: Vec<_> = fragments(doc).collect();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "    a: 1,\n\n    b: 2\n");
        assert_eq!((frags[0].start_line, frags[0].end_line), (4, 6));
        assert_eq!(frags[0].lang, DEFAULT_LANG);
    }

    #[test]
    fn indented_block_at_end_of_document() {
        let frags: Vec<_> = fragments("\n\ta: 1").collect();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "\ta: 1");
        assert_eq!((frags[0].start_line, frags[0].end_line), (2, 2));
    }

    #[test]
    fn unterminated_fence_runs_to_the_end() {
        let frags: Vec<_> = fragments("```lambdascript\na: 1\nb: 2\n").collect();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "a: 1\nb: 2\n");
        assert_eq!(frags[0].end_line, 3);
    }

    #[test]
    fn longer_fence_needs_matching_close() {
        let frags: Vec<_> = fragments("````\n```\ninner\n````\n").collect();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "```\ninner\n");
    }

    #[test]
    fn mixed_fence_characters_do_not_open_a_block() {
        assert_eq!(fragments("`~`\na: 1\n`~`\n").count(), 0);
        assert_eq!(fragments("``~~\na: 1\n").count(), 0);
    }

    #[test]
    fn fence_ends_at_the_first_other_character() {
        let frags: Vec<_> = fragments("```~python\nx\n```\n").collect();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].lang, "~python");
        let frags: Vec<_> = fragments("~~~~python\n```\n~~~~\n").collect();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].lang, "python");
        assert_eq!(frags[0].text, "```\n");
    }

    #[test]
    fn line_after_indented_block_is_reconsidered() {
        let frags: Vec<_> = fragments("\n    a: 1\n```\nb: 2\n```\n").collect();
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[1].text, "b: 2\n");
        assert_eq!(frags[1].start_line, 3);
    }
}
