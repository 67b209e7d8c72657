//! Result records of inspection commands to typed values.

use crate::debugger::address::Address;
use crate::debugger::breakpoint::{BreakMode, Breakpoint, Disposition};
use crate::debugger::decode::decode_breakpoint;
use crate::debugger::error::Error;
use crate::debugger::frame::{Frame, Instruction, Variable};
use crate::debugger::path::PathTranslator;
use crate::debugger::register::{Register, RegisterNames};
use crate::mi::command::{BreakInfo, MiBreakpoint, MiDisposition};
use crate::mi::{Lookup, MiResult, ResultRecord};

/// Reply of `-break-insert`.
pub fn inserted_breakpoint(
    translator: &PathTranslator,
    record: &ResultRecord,
) -> Result<Breakpoint, Error> {
    if record.results.get_tuple("bkpt").is_none() {
        return Err(Error::InvalidReply("-break-insert reply without bkpt"));
    }
    Ok(decode_breakpoint(translator, &record.results))
}

/// Rows of `-break-list` reply decoded with the same rules as breakpoint notifications.
pub fn break_table(
    translator: &PathTranslator,
    record: &ResultRecord,
) -> Result<Vec<Breakpoint>, Error> {
    let body = record
        .results
        .get_tuple("BreakpointTable")
        .and_then(|table| table.get_list("body"))
        .ok_or(Error::InvalidReply("-break-list reply without BreakpointTable"))?;

    Ok(body
        .iter()
        .filter(|row| row.is("bkpt"))
        .filter_map(|row| row.value.as_tuple())
        .map(|fields| decode_breakpoint(translator, fields))
        .collect())
}

/// Breakpoints from a typed `-break-info` reply.
pub fn break_info(translator: &PathTranslator, info: BreakInfo) -> Vec<Breakpoint> {
    info.breakpoints
        .into_iter()
        .map(|bp| from_table_row(translator, bp))
        .collect()
}

fn from_table_row(translator: &PathTranslator, row: MiBreakpoint) -> Breakpoint {
    let disposition = match row.disposition {
        MiDisposition::Delete => Disposition::DeleteNextHit,
        MiDisposition::DeleteNextStop => Disposition::DeleteNextStop,
        MiDisposition::Disable => Disposition::Disable,
        MiDisposition::Keep | MiDisposition::Unknown(_) => Disposition::Keep,
    };

    Breakpoint {
        id: Some(row.number),
        mode: BreakMode::from_mi(&row.kind),
        disposition,
        enabled: row.enabled,
        address: row
            .address
            .as_deref()
            .map(Address::parse)
            .unwrap_or(Address::INVALID),
        function: row.function,
        file: translator.choose_file(row.file.as_deref(), row.fullname.as_deref()),
        line: row.line.unwrap_or_default(),
        count: row.times,
        thread: row.thread,
        condition: row.condition,
    }
}

fn list<'a>(record: &'a ResultRecord, name: &'static str) -> Result<&'a [MiResult], Error> {
    record
        .results
        .get_list(name)
        .ok_or(Error::InvalidReply(name))
}

fn variable(fields: &[MiResult]) -> Option<Variable> {
    Some(Variable {
        name: fields.get_str("name")?.to_string(),
        type_name: fields.get_str("type").map(ToString::to_string),
        value: fields.get_str("value").map(ToString::to_string),
    })
}

/// Reply of `-stack-list-frames`.
pub fn frames(translator: &PathTranslator, record: &ResultRecord) -> Result<Vec<Frame>, Error> {
    Ok(list(record, "stack")?
        .iter()
        .filter_map(|frame| frame.value.as_tuple())
        .map(|frame| Frame {
            address: frame
                .get_str("addr")
                .map(Address::parse)
                .unwrap_or(Address::INVALID),
            function: frame.get_str("func").map(ToString::to_string),
            file: translator.choose_file(frame.get_str("file"), frame.get_str("fullname")),
            line: frame
                .get_str("line")
                .and_then(|l| l.parse().ok())
                .unwrap_or_default(),
            depth: frame
                .get_str("level")
                .and_then(|l| l.parse().ok())
                .unwrap_or_default(),
        })
        .collect())
}

/// Reply of `-stack-list-locals --simple-values`.
pub fn locals(record: &ResultRecord) -> Result<Vec<Variable>, Error> {
    Ok(list(record, "locals")?
        .iter()
        .filter_map(|local| variable(local.value.as_tuple()?))
        .collect())
}

/// Reply of `-stack-list-arguments --simple-values N N`, arguments of frame `depth`.
pub fn params(record: &ResultRecord, depth: u32) -> Result<Vec<Variable>, Error> {
    let depth = depth.to_string();
    let frame = list(record, "stack-args")?
        .iter()
        .filter_map(|frame| frame.value.as_tuple())
        .find(|frame| frame.get_str("level").map_or(true, |level| level == depth));

    Ok(frame
        .and_then(|frame| frame.get_list("args"))
        .unwrap_or_default()
        .iter()
        .filter_map(|arg| variable(arg.value.as_tuple()?))
        .collect())
}

/// Reply of `-data-list-register-names`. Register number is the position in the list,
/// gdb leaves holes as empty names.
pub fn register_names(record: &ResultRecord) -> Result<RegisterNames, Error> {
    Ok(list(record, "register-names")?
        .iter()
        .enumerate()
        .filter_map(|(number, name)| {
            let name = name.value.as_str()?;
            (!name.is_empty()).then(|| (number.to_string(), name.to_string()))
        })
        .collect())
}

/// Reply of `-data-list-register-values x`.
pub fn registers(record: &ResultRecord, names: &RegisterNames) -> Result<Vec<Register>, Error> {
    Ok(list(record, "register-values")?
        .iter()
        .filter_map(|reg| {
            let reg = reg.value.as_tuple()?;
            let number = reg.get_str("number")?;
            Some(Register {
                number: number.to_string(),
                name: names.get(number).cloned(),
                value: reg.get_str("value")?.to_string(),
            })
        })
        .collect())
}

/// Reply of `-data-disassemble ... -- 0`.
pub fn instructions(record: &ResultRecord) -> Result<Vec<Instruction>, Error> {
    Ok(list(record, "asm_insns")?
        .iter()
        .filter_map(|insn| {
            let insn = insn.value.as_tuple()?;
            Some(Instruction {
                address: Address::parse(insn.get_str("address")?),
                function: insn.get_str("func-name").map(ToString::to_string),
                display: insn.get_str("inst").unwrap_or_default().to_string(),
            })
        })
        .collect())
}
