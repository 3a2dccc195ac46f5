//! The builtin opcode set used by the `vn` binary and the integration tests.

use crate::error::MachineError;
use crate::operation::CompletionHook;
use crate::ops::{PauseOperation, SoundTarget, TextoutOperation, WaitForSound, WaitOperation};
use crate::registry::OpcodeRegistry;
use vn_bytecode::descriptor::{ARGC_INT, INT, INT_REF, POINT, RECT_GRP, RECT_REC, STR};
use vn_bytecode::{IntLocation, TypeDescriptor};
use vn_core::{Point, Rect};

const ZERO: TypeDescriptor = TypeDescriptor::DefaultInt(0);

pub mod keys {
    use vn_bytecode::OpcodeKey;

    pub const END: OpcodeKey = OpcodeKey::new(0, 0, 0);

    pub const TEXTOUT: OpcodeKey = OpcodeKey::new(1, 0, 0);
    pub const BR: OpcodeKey = OpcodeKey::new(1, 1, 0);
    pub const PAGE: OpcodeKey = OpcodeKey::new(1, 2, 0);
    pub const PAUSE: OpcodeKey = OpcodeKey::new(1, 3, 0);
    pub const PAUSE_PAGE: OpcodeKey = OpcodeKey::new(1, 4, 0);
    pub const PAUSE_BR: OpcodeKey = OpcodeKey::new(1, 5, 0);

    pub const WAIT: OpcodeKey = OpcodeKey::new(2, 0, 0);
    pub const WAIT_C: OpcodeKey = OpcodeKey::new(2, 1, 0);

    pub const SET: OpcodeKey = OpcodeKey::new(3, 0, 0);
    pub const ADD: OpcodeKey = OpcodeKey::new(3, 1, 0);
    pub const SUM: OpcodeKey = OpcodeKey::new(3, 2, 0);
    pub const STORE: OpcodeKey = OpcodeKey::new(3, 3, 0);

    pub const BGM_WAIT: OpcodeKey = OpcodeKey::new(4, 0, 0);
    pub const BGM_WAIT_C: OpcodeKey = OpcodeKey::new(4, 1, 0);
    pub const WAV_WAIT: OpcodeKey = OpcodeKey::new(4, 2, 0);
    pub const WAV_WAIT_C: OpcodeKey = OpcodeKey::new(4, 3, 0);

    pub const FILL_RECT_GRP: OpcodeKey = OpcodeKey::new(5, 0, 0);
    pub const FILL_RECT_REC: OpcodeKey = OpcodeKey::new(5, 0, 1);
    pub const MOVE_OBJECT: OpcodeKey = OpcodeKey::new(5, 1, 0);
}

pub fn registry() -> Result<OpcodeRegistry, MachineError> {
    let mut registry = OpcodeRegistry::new();
    install(&mut registry)?;
    Ok(registry)
}

pub fn install(registry: &mut OpcodeRegistry) -> Result<(), MachineError> {
    registry.register(keys::END, "end", &[], |ctx, (): ()| {
        ctx.halt();
        Ok(())
    })?;

    registry.register(keys::TEXTOUT, "textout", &[&STR], |ctx, (text,): (String,)| {
        let operation = TextoutOperation::from_context(ctx, &text);
        ctx.push(operation);
        Ok(())
    })?;
    registry.register(keys::BR, "br", &[], |ctx, (): ()| ctx.system.text.hard_break())?;
    registry.register(keys::PAGE, "page", &[], |ctx, (): ()| ctx.system.text.new_page())?;
    registry.register(keys::PAUSE, "pause", &[], |ctx, (): ()| {
        let pause = PauseOperation::from_context(ctx);
        ctx.push(pause);
        Ok(())
    })?;
    registry.register(keys::PAUSE_PAGE, "pause_page", &[], |ctx, (): ()| {
        let pause = PauseOperation::from_context(ctx);
        ctx.push_with_hook(pause, CompletionHook::NewPage);
        Ok(())
    })?;
    registry.register(keys::PAUSE_BR, "pause_br", &[], |ctx, (): ()| {
        let pause = PauseOperation::from_context(ctx);
        ctx.push_with_hook(pause, CompletionHook::HardBreak);
        Ok(())
    })?;

    registry.register(keys::WAIT, "wait", &[&INT], |ctx, (ms,): (i32,)| {
        let wait = WaitOperation::new(ctx.now(), duration(ms));
        ctx.push(wait);
        Ok(())
    })?;
    registry.register(keys::WAIT_C, "waitC", &[&INT], |ctx, (ms,): (i32,)| {
        let wait = WaitOperation::new(ctx.now(), duration(ms))
            .interruptible()
            .saving_to_store();
        ctx.push(wait);
        Ok(())
    })?;

    registry.register(
        keys::SET,
        "set",
        &[&INT_REF, &INT],
        |ctx, (target, value): (IntLocation, i32)| ctx.memory.set_int_at(target, value),
    )?;
    registry.register(
        keys::ADD,
        "add",
        &[&INT_REF, &INT],
        |ctx, (target, value): (IntLocation, i32)| {
            let current = ctx.memory.int_at(target)?;
            ctx.memory.set_int_at(target, current.wrapping_add(value))
        },
    )?;
    registry.register(
        keys::SUM,
        "sum",
        &[&INT_REF, &ARGC_INT],
        |ctx, (target, values): (IntLocation, Vec<i32>)| {
            let total = values.into_iter().fold(0i32, i32::wrapping_add);
            ctx.memory.set_int_at(target, total)
        },
    )?;
    registry.register(keys::STORE, "store", &[&INT], |ctx, (value,): (i32,)| {
        ctx.memory.set_store(value);
        Ok(())
    })?;

    registry.register(keys::BGM_WAIT, "bgmWait", &[], |ctx, (): ()| {
        ctx.push(WaitForSound::new(SoundTarget::Bgm));
        Ok(())
    })?;
    registry.register(keys::BGM_WAIT_C, "bgmWaitC", &[], |ctx, (): ()| {
        ctx.push(WaitForSound::new(SoundTarget::Bgm).interruptible());
        Ok(())
    })?;
    registry.register(keys::WAV_WAIT, "wavWait", &[&ZERO], |ctx, (channel,): (i32,)| {
        ctx.push(WaitForSound::new(SoundTarget::Wav(channel)));
        Ok(())
    })?;
    registry.register(keys::WAV_WAIT_C, "wavWaitC", &[&ZERO], |ctx, (channel,): (i32,)| {
        ctx.push(WaitForSound::new(SoundTarget::Wav(channel)).interruptible());
        Ok(())
    })?;

    registry.register(
        keys::FILL_RECT_GRP,
        "fill_rect",
        &[&RECT_GRP, &ZERO],
        |ctx, (rect, color): (Rect, i32)| ctx.system.graphics.fill_rect(rect, color),
    )?;
    registry.register(
        keys::FILL_RECT_REC,
        "fill_rect",
        &[&RECT_REC, &ZERO],
        |ctx, (rect, color): (Rect, i32)| ctx.system.graphics.fill_rect(rect, color),
    )?;
    registry.register(
        keys::MOVE_OBJECT,
        "move_object",
        &[&INT, &POINT],
        |ctx, (object, position): (i32, Point)| ctx.system.graphics.move_object(object, position),
    )?;
    Ok(())
}

fn duration(ms: i32) -> u64 {
    u64::try_from(ms).unwrap_or(0)
}
