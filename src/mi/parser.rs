use crate::mi::{
    AsyncClass, AsyncKind, AsyncRecord, MiResult, OobRecord, ParsedOutput, ResultClass,
    ResultRecord, StreamKind, StreamRecord, Value,
};
use bytes::{Buf, BytesMut};
use chumsky::error::Rich;
use chumsky::prelude::{any, choice, end, just, none_of, one_of, recursive};
use chumsky::{extra, text, IterParser, Parser};
use std::str::FromStr;

type Err<'a> = extra::Err<Rich<'a, char>>;

const PROMPT: &str = "(gdb)";

/// Incremental MI output parser. Bytes are buffered until a full line is available.
#[derive(Default)]
pub struct MiParser {
    buffer: BytesMut,
}

impl MiParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of gdb output, return outputs for every complete line in it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<ParsedOutput> {
        self.buffer.extend_from_slice(bytes);

        let mut outputs = vec![];
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line = self.buffer.split_to(pos);
            self.buffer.advance(1);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }

            let line = String::from_utf8_lossy(&line);
            if line.trim().is_empty() {
                continue;
            }
            outputs.push(parse_line(&line));
        }
        outputs
    }

    /// Bytes of an incomplete trailing line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Parse a single line (without terminator) of gdb output.
pub fn parse_line(line: &str) -> ParsedOutput {
    if line.starts_with(PROMPT) {
        return ParsedOutput::Prompt;
    }

    match record().parse(line).into_result() {
        Ok(Record::Result {
            token,
            class,
            results,
        }) => ParsedOutput::Result(ResultRecord {
            token,
            class,
            results,
            line: line.to_string(),
        }),
        Ok(Record::OutOfBand(oob)) => ParsedOutput::OutOfBand(oob),
        Err(errors) => {
            if let Some(e) = errors.first() {
                log::debug!(target: "mi::parser", "{e} in {line:?}");
            }
            ParsedOutput::ParseError(line.to_string())
        }
    }
}

enum Record {
    Result {
        token: Option<String>,
        class: ResultClass,
        results: Vec<MiResult>,
    },
    OutOfBand(OobRecord),
}

/// Decode the escapes gdb uses for layout and quoting. Anything else, octal byte
/// escapes included, stays as is.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn c_string<'a>() -> impl Parser<'a, &'a str, String, Err<'a>> + Clone {
    choice((
        just('\\').then(any()).ignored(),
        none_of("\\\"").ignored(),
    ))
    .repeated()
    .to_slice()
    .delimited_by(just('"'), just('"'))
    .map(unescape)
    .labelled("c-string")
}

fn identifier<'a>() -> impl Parser<'a, &'a str, &'a str, Err<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .labelled("identifier")
}

fn value<'a>() -> impl Parser<'a, &'a str, Value, Err<'a>> + Clone {
    recursive(|value| {
        let result = identifier()
            .then_ignore(just('='))
            .or_not()
            .then(value)
            .map(|(variable, value): (Option<&str>, Value)| MiResult {
                variable: variable.map(ToString::to_string),
                value,
            });
        let entries = result.separated_by(just(',')).collect::<Vec<_>>();

        let tuple = entries
            .clone()
            .delimited_by(just('{'), just('}'))
            .map(Value::Tuple);
        let list = entries.delimited_by(just('['), just(']')).map(Value::List);

        choice((c_string().map(Value::Const), tuple, list))
    })
}

fn result<'a>() -> impl Parser<'a, &'a str, MiResult, Err<'a>> + Clone {
    identifier()
        .then_ignore(just('='))
        .or_not()
        .then(value())
        .map(|(variable, value): (Option<&str>, Value)| MiResult {
            variable: variable.map(ToString::to_string),
            value,
        })
}

fn record<'a>() -> impl Parser<'a, &'a str, Record, Err<'a>> {
    let token = text::digits(10)
        .at_least(1)
        .to_slice()
        .map(ToString::to_string)
        .or_not();
    let results = just(',')
        .ignore_then(result())
        .repeated()
        .collect::<Vec<_>>();

    let result_record = token
        .clone()
        .then_ignore(just('^'))
        .then(identifier().try_map(|class: &str, span| {
            ResultClass::from_str(class)
                .map_err(|_| Rich::custom(span, format!("unknown result class `{class}`")))
        }))
        .then(results.clone())
        .map(|((token, class), results)| Record::Result {
            token,
            class,
            results,
        });

    let async_kind = one_of("*+=").map(|c| match c {
        '*' => AsyncKind::Exec,
        '+' => AsyncKind::Status,
        _ => AsyncKind::Notify,
    });
    let async_record = token
        .then(async_kind)
        .then(identifier().map(|class: &str| {
            AsyncClass::from_str(class).unwrap_or_else(|_| AsyncClass::Unsupported(class.into()))
        }))
        .then(results)
        .map(|(((token, kind), class), results)| {
            Record::OutOfBand(OobRecord::Async(AsyncRecord {
                token,
                kind,
                class,
                results,
            }))
        });

    let stream_kind = one_of("~@&").map(|c| match c {
        '~' => StreamKind::Console,
        '@' => StreamKind::Target,
        _ => StreamKind::Log,
    });
    let stream_record = stream_kind
        .then(c_string())
        .map(|(kind, text)| Record::OutOfBand(OobRecord::Stream(StreamRecord { kind, text })));

    choice((result_record, async_record, stream_record))
        .then_ignore(text::inline_whitespace())
        .then_ignore(end())
}
