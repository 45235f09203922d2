//! Recursive-descent node engine
//!
//! A [`Node`] is the decoding state of one BER element. Nodes live on an
//! explicit stack inside the per-call [`Session`]; creating a node pushes a
//! record, dropping it pops the record and folds the bytes the element
//! consumed into its parent's body count. Because a child node mutably
//! borrows the session through its parent, only the innermost node can act
//! at any time, and the stack top is always the node doing the work.

use crate::ber::decoder::ErrorSeverity;
use crate::ber::types::{BerLength, BerTag, BerTagClass, BerTagType};
use crate::ber::universal::{self, UniversalTagNumber};
use crate::schema::{
    ArrayValue, BerValue, ChoiceValue, CustomizedValue, DynamicValue, EnumValue, FieldInfo,
    NullableValue, SequenceValue, SimpleValue, ValueMut,
};
use ber_core::{BerError, BerResult, DecoderOptions, FormattingMode};
use bytes::{Buf, Bytes, BytesMut};
use std::fmt;

/// Bookkeeping for one element on the node stack
#[derive(Debug, Clone)]
pub(crate) struct NodeState {
    tag: BerTag,
    length: BerLength,
    consumed_header: usize,
    consumed_body: usize,
    consumed_tail: usize,
    formatting_mode: FormattingMode,
    field_name: Option<&'static str>,
    start_position: usize,
}

impl NodeState {
    fn new(formatting_mode: FormattingMode, start_position: usize) -> Self {
        Self {
            tag: BerTag::universal(false, 0),
            length: BerLength::Definite(0),
            consumed_header: 0,
            consumed_body: 0,
            consumed_tail: 0,
            formatting_mode,
            field_name: None,
            start_position,
        }
    }

    fn total_consumed(&self) -> usize {
        self.consumed_header + self.consumed_body + self.consumed_tail
    }

    /// Body bytes still available, `None` for indefinite length
    fn remaining_body(&self) -> Option<usize> {
        self.length
            .value()
            .map(|length| length.saturating_sub(self.consumed_body))
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}, length {}, offset {}]",
            self.field_name.unwrap_or("<anonymous>"),
            self.tag,
            self.length,
            self.start_position
        )
    }
}

/// Per-call decoding state
///
/// Owns the node stack, the position in the stream and the diagnostics
/// gathered during one `decode` call.
pub(crate) struct Session<'a> {
    options: &'a DecoderOptions,
    stream: &'a mut dyn Buf,
    position: usize,
    nodes: Vec<NodeState>,
    severity: ErrorSeverity,
    log: Option<String>,
    max_depth_exceeded: bool,
}

impl<'a> Session<'a> {
    /// `log` is a buffer kept from an earlier call; it must already be empty.
    pub(crate) fn new(
        options: &'a DecoderOptions,
        stream: &'a mut dyn Buf,
        log: Option<String>,
    ) -> Self {
        Self {
            options,
            stream,
            position: 0,
            nodes: Vec::new(),
            severity: ErrorSeverity::Success,
            log,
            max_depth_exceeded: false,
        }
    }

    /// Bytes read from the stream so far
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn depth(&self) -> usize {
        self.nodes.len()
    }

    /// Severity, log buffer and depth-exceeded flag of the finished call
    pub(crate) fn finish(self) -> (ErrorSeverity, Option<String>, bool) {
        (self.severity, self.log, self.max_depth_exceeded)
    }

    fn peek_u8(&self) -> Option<u8> {
        if self.stream.has_remaining() {
            self.stream.chunk().first().copied()
        } else {
            None
        }
    }

    fn read_exact(&mut self, length: usize) -> BerResult<Bytes> {
        if self.stream.remaining() < length {
            return Err(BerError::InvalidData(format!(
                "Stream exhausted: need {} bytes, have {}",
                length,
                self.stream.remaining()
            )));
        }
        let contents = self.stream.copy_to_bytes(length);
        self.position += length;
        Ok(contents)
    }

    fn skip_exact(&mut self, length: usize) -> BerResult<()> {
        if self.stream.remaining() < length {
            return Err(BerError::InvalidData(format!(
                "Stream exhausted: need {} bytes, have {}",
                length,
                self.stream.remaining()
            )));
        }
        self.stream.advance(length);
        self.position += length;
        Ok(())
    }

    /// Ancestor chain from the root to the innermost node
    fn render_stack(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.to_string())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    fn log_stream(&mut self) -> &mut String {
        self.log.get_or_insert_with(String::new)
    }

    /// Record an error line with the current node stack and escalate the
    /// severity.
    pub(crate) fn log_error(&mut self, msg: &str) {
        self.severity = ErrorSeverity::Error;
        let line = format!(
            "{} (at offset {}): {}",
            msg,
            self.position,
            self.render_stack()
        );
        log::debug!("BER decode error: {}", line);
        let log = self.log_stream();
        log.push_str(&line);
        log.push('\n');
    }

    fn log_trace(&mut self, msg: &str) {
        log::trace!("{}", msg);
        if self.options.trace_level() > 0 {
            let log = self.log_stream();
            log.push_str("TRACE: ");
            log.push_str(msg);
            log.push('\n');
        }
    }
}

/// One BER element being decoded
pub(crate) struct Node<'s, 'a> {
    session: &'s mut Session<'a>,
    index: usize,
}

impl<'s, 'a> Node<'s, 'a> {
    /// Push a new node, inheriting the parent's formatting mode
    pub(crate) fn new(session: &'s mut Session<'a>) -> Self {
        let formatting_mode = session
            .nodes
            .last()
            .map(|parent| parent.formatting_mode)
            .unwrap_or_default();
        let index = session.nodes.len();
        session
            .nodes
            .push(NodeState::new(formatting_mode, session.position));
        Self { session, index }
    }

    fn state(&self) -> &NodeState {
        &self.session.nodes[self.index]
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.session.nodes[self.index]
    }

    fn parent(&self) -> Option<&NodeState> {
        self.index
            .checked_sub(1)
            .map(|parent| &self.session.nodes[parent])
    }

    pub(crate) fn tag(&self) -> BerTag {
        self.state().tag
    }

    pub(crate) fn length(&self) -> BerLength {
        self.state().length
    }

    pub(crate) fn formatting_mode(&self) -> FormattingMode {
        self.state().formatting_mode
    }

    pub(crate) fn set_formatting_mode(&mut self, formatting_mode: FormattingMode) {
        self.state_mut().formatting_mode = formatting_mode;
    }

    pub(crate) fn set_field_name(&mut self, name: &'static str) {
        self.state_mut().field_name = Some(name);
    }

    /// Log `err` with the node stack and hand it back for returning
    pub(crate) fn log_error(&mut self, err: BerError) -> BerError {
        self.session.log_error(&err.to_string());
        err
    }

    /// Read the identifier and length octets of this element
    ///
    /// # Error Handling
    /// Returns error if:
    /// - The node stack is deeper than `max_depth`
    /// - The identifier or length octets are truncated or malformed
    /// - A primitive element uses indefinite length
    /// - A definite length exceeds the bytes left in the stream or in the
    ///   enclosing definite-length element
    pub(crate) fn read_tag_header(&mut self) -> BerResult<()> {
        let max_depth = self.session.options.max_depth();
        if self.session.depth() > max_depth {
            self.session.max_depth_exceeded = true;
            return Err(self.log_error(BerError::MaxDepthExceeded { max_depth }));
        }

        let (tag, tag_octets) = match BerTag::read(&mut *self.session.stream) {
            Ok(read) => read,
            Err(e) => return Err(self.log_error(e)),
        };
        self.session.position += tag_octets;

        let (length, length_octets) = match BerLength::read(&mut *self.session.stream) {
            Ok(read) => read,
            Err(e) => return Err(self.log_error(e)),
        };
        self.session.position += length_octets;

        {
            let state = self.state_mut();
            state.tag = tag;
            state.length = length;
            state.consumed_header = tag_octets + length_octets;
        }

        match length {
            BerLength::Indefinite if tag.tag_type() == BerTagType::Primitive => {
                return Err(self.log_error(BerError::invalid_data(
                    "Indefinite length is not allowed for PRIMITIVE tag type",
                )));
            }
            BerLength::Definite(body) if body > self.session.stream.remaining() => {
                let remaining = self.session.stream.remaining();
                return Err(self.log_error(BerError::InvalidData(format!(
                    "Length {} exceeds the {} bytes remaining in the stream",
                    body, remaining
                ))));
            }
            _ => {}
        }

        let declared = self.state().consumed_header + length.value().unwrap_or(0);
        let available = self.parent().and_then(NodeState::remaining_body);
        if let Some(available) = available.filter(|&available| declared > available) {
            return Err(self.log_error(BerError::InvalidData(format!(
                "Element of {} bytes exceeds the {} bytes left in the enclosing element",
                declared, available
            ))));
        }

        let msg = format!("read header {}", self.state());
        self.session.log_trace(&msg);
        Ok(())
    }

    /// Finish the element
    ///
    /// Definite length: the body must have been consumed exactly.
    /// Indefinite length: the end-of-contents octets `0x00 0x00` are read.
    pub(crate) fn read_tag_trailer(&mut self) -> BerResult<()> {
        match self.length() {
            BerLength::Definite(expected) => {
                let consumed = self.state().consumed_body;
                if consumed != expected {
                    return Err(self.log_error(BerError::LengthMismatch { expected, consumed }));
                }
                Ok(())
            }
            BerLength::Indefinite => {
                if self.session.stream.remaining() < 2 {
                    return Err(self.log_error(BerError::MissingEndOfContents));
                }
                let first = self.session.stream.get_u8();
                let second = self.session.stream.get_u8();
                self.session.position += 2;
                if first != 0 || second != 0 {
                    return Err(self.log_error(BerError::MissingEndOfContents));
                }
                self.state_mut().consumed_tail = 2;
                Ok(())
            }
        }
    }

    /// Whether another child element follows in this constructed element
    pub(crate) fn has_more(&self) -> bool {
        match self.length() {
            BerLength::Definite(expected) => self.state().consumed_body < expected,
            BerLength::Indefinite => matches!(self.session.peek_u8(), Some(byte) if byte != 0),
        }
    }

    /// Consume the body of this element without decoding it
    pub(crate) fn skip_field(&mut self) -> BerResult<()> {
        match self.length() {
            BerLength::Definite(length) => {
                if let Err(e) = self.session.skip_exact(length) {
                    return Err(self.log_error(e));
                }
                self.state_mut().consumed_body = length;
                Ok(())
            }
            BerLength::Indefinite => {
                while self.has_more() {
                    let mut inner = Node::new(&mut *self.session);
                    inner.read_tag_header()?;
                    inner.skip_field()?;
                    inner.read_tag_trailer()?;
                }
                Ok(())
            }
        }
    }

    /// Decode the body of this element into `value`
    ///
    /// The tag header must already be read and validated by the caller.
    pub(crate) fn decode(&mut self, value: &mut dyn BerValue) -> BerResult<()> {
        self.decode_by_category(value.value_mut())
    }

    fn decode_by_category(&mut self, value: ValueMut<'_>) -> BerResult<()> {
        match value {
            ValueMut::Simple(simple) => self.decode_simple(simple),
            ValueMut::Sequence(sequence) => self.decode_sequence(sequence),
            ValueMut::Choice(choice) => self.decode_choice(choice),
            ValueMut::Array(array) => self.decode_array(array),
            ValueMut::ByteArray(bytes) => self.decode_byte_array(bytes),
            ValueMut::Nullable(nullable) => self.decode_nullable(nullable),
            ValueMut::Customized(customized) => self.decode_customized(customized),
            ValueMut::Enumeration(enumeration) => self.decode_enumeration(enumeration),
            ValueMut::Dynamic(dynamic) => self.decode_dynamic(dynamic),
        }
    }

    /// Decode a field after taking its name and formatting mode
    fn decode_field(&mut self, info: &FieldInfo, value: Option<&mut dyn BerValue>) -> BerResult<()> {
        self.set_formatting_mode(info.formatting_mode);
        self.set_field_name(info.name);
        match value {
            Some(value) => self.decode(value),
            None => Err(self.log_error(BerError::Conversion(format!(
                "Schema has no value for field '{}'",
                info.name
            )))),
        }
    }

    fn expect_tag_type(&mut self, expected: BerTagType, what: &str) -> BerResult<()> {
        if self.tag().tag_type() != expected {
            return Err(self.log_error(BerError::TagMismatch(format!(
                "Expected {} tag type for {}",
                expected.name(),
                what
            ))));
        }
        Ok(())
    }

    fn read_body(&mut self) -> BerResult<Bytes> {
        let Some(length) = self.length().value() else {
            return Err(self.log_error(BerError::invalid_data(
                "Indefinite length is not allowed for PRIMITIVE tag type",
            )));
        };
        match self.session.read_exact(length) {
            Ok(contents) => {
                self.state_mut().consumed_body = length;
                Ok(contents)
            }
            Err(e) => Err(self.log_error(e)),
        }
    }

    fn decode_simple(&mut self, value: &mut dyn SimpleValue) -> BerResult<()> {
        self.expect_tag_type(BerTagType::Primitive, "simple type")?;
        let contents = self.read_body()?;
        if let Err(e) = value.read_contents(&contents) {
            return Err(self.log_error(e));
        }
        Ok(())
    }

    fn decode_enumeration(&mut self, value: &mut dyn EnumValue) -> BerResult<()> {
        let mut raw = 0i32;
        self.decode_simple(&mut raw)?;
        if let Err(e) = value.from_int(raw) {
            return Err(self.log_error(e));
        }
        Ok(())
    }

    fn decode_customized(&mut self, value: &mut dyn CustomizedValue) -> BerResult<()> {
        let mut base_failed = false;
        let result = value.decode_base(&mut |base: &mut dyn BerValue| {
            let result = self.decode(base);
            base_failed = result.is_err();
            result
        });
        match result {
            Ok(()) => Ok(()),
            // already logged by the base decode
            Err(e) if base_failed => Err(e),
            Err(e) => Err(self.log_error(e)),
        }
    }

    fn decode_sequence(&mut self, value: &mut dyn SequenceValue) -> BerResult<()> {
        self.expect_tag_type(BerTagType::Constructed, "sequence")?;
        let skip_unknown = self.session.options.skip_unknown_elements();

        while self.has_more() {
            let mut inner = Node::new(&mut *self.session);
            inner.read_tag_header()?;
            if inner.tag().class() != BerTagClass::ContextSpecific {
                return Err(inner.log_error(BerError::tag_mismatch(
                    "Expected CONTEXT tag class inside sequence",
                )));
            }

            let tag_number = inner.tag().number();
            match value.lookup_attribute_info(tag_number) {
                Some(info) => inner.decode_field(info, value.attribute_mut(tag_number))?,
                None if skip_unknown => {
                    log::debug!("Skipping unknown sequence attribute {}", tag_number);
                    inner.skip_field()?;
                }
                None => {
                    return Err(inner.log_error(BerError::UnknownAttribute { tag_number }));
                }
            }

            inner.read_tag_trailer()?;
        }
        Ok(())
    }

    fn decode_choice(&mut self, value: &mut dyn ChoiceValue) -> BerResult<()> {
        self.expect_tag_type(BerTagType::Constructed, "choice")?;

        if self.formatting_mode().is_untagged() {
            if self.has_more() {
                return self.decode_choice_selection(value);
            }
            return Ok(());
        }

        let mut inner = Node::new(&mut *self.session);
        inner.read_tag_header()?;
        if inner.tag().class() != BerTagClass::ContextSpecific {
            return Err(inner.log_error(BerError::tag_mismatch(
                "Expected CONTEXT tag class for tagged choice",
            )));
        }
        if inner.tag().tag_type() != BerTagType::Constructed {
            return Err(inner.log_error(BerError::tag_mismatch(
                "Expected CONSTRUCTED tag type for tagged choice",
            )));
        }
        if inner.tag().number() != 0 {
            return Err(inner.log_error(BerError::tag_mismatch(
                "Expected 0 as a tag number for tagged choice",
            )));
        }
        if inner.has_more() {
            inner.decode_choice_selection(value)?;
        }
        inner.read_tag_trailer()
    }

    /// Decode exactly one selection element
    fn decode_choice_selection(&mut self, value: &mut dyn ChoiceValue) -> BerResult<()> {
        let mut inner = Node::new(&mut *self.session);
        inner.read_tag_header()?;
        if inner.tag().class() != BerTagClass::ContextSpecific {
            return Err(inner.log_error(BerError::tag_mismatch(
                "Expected CONTEXT tag class for internal choice",
            )));
        }

        let tag_number = inner.tag().number();
        let Some(info) = value.lookup_selection_info(tag_number) else {
            return Err(inner.log_error(BerError::UnknownSelection { tag_number }));
        };
        if let Err(e) = value.make_selection(tag_number) {
            return Err(inner.log_error(e));
        }
        if value.selection_id() != Some(tag_number) {
            return Err(inner.log_error(BerError::Conversion(format!(
                "Unable to make choice selection '{}'",
                info.name
            ))));
        }
        inner.decode_field(info, value.selection_mut())?;
        inner.read_tag_trailer()
    }

    fn decode_nullable(&mut self, value: &mut dyn NullableValue) -> BerResult<()> {
        if !self.formatting_mode().is_nillable() {
            value.make_value();
            return match value.inner_mut() {
                Some(inner_value) => self.decode(inner_value),
                None => Err(self.log_error(BerError::conversion(
                    "Nullable value has no contained value after make_value",
                ))),
            };
        }

        self.expect_tag_type(BerTagType::Constructed, "nullable")?;
        if !self.has_more() {
            value.reset();
            return Ok(());
        }

        let mut inner = Node::new(&mut *self.session);
        inner.read_tag_header()?;
        if inner.tag().class() != BerTagClass::ContextSpecific {
            return Err(inner.log_error(BerError::tag_mismatch(
                "Expected CONTEXT tag class for inner nillable",
            )));
        }
        if inner.tag().number() != 0 {
            return Err(inner.log_error(BerError::tag_mismatch(
                "Expected 0 as tag number for inner nillable",
            )));
        }

        value.make_value();
        match value.inner_mut() {
            Some(inner_value) => inner.decode(inner_value)?,
            None => {
                return Err(inner.log_error(BerError::conversion(
                    "Nullable value has no contained value after make_value",
                )));
            }
        }
        inner.read_tag_trailer()
    }

    fn decode_array(&mut self, value: &mut dyn ArrayValue) -> BerResult<()> {
        self.expect_tag_type(BerTagType::Constructed, "array")?;
        let max_size = self.session.options.max_sequence_size();

        value.resize(0);
        while self.has_more() {
            let size = value.size();
            if size + 1 > max_size {
                return Err(self.log_error(BerError::ArraySizeExceeded { max_size }));
            }
            value.resize(size + 1);
            let Some(element) = value.element_mut(size) else {
                return Err(self.log_error(BerError::Conversion(format!(
                    "Array has no element at index {} after resize",
                    size
                ))));
            };
            if let Err(e) = UniversalElementVisitor::new(&mut *self.session).visit(element) {
                self.session
                    .log_error(&format!("Error in decoding array element {}", size));
                return Err(e);
            }
        }
        Ok(())
    }

    /// Raw octets: one primitive read, or the concatenation of the
    /// OCTET STRING segments of a constructed encoding.
    fn decode_byte_array(&mut self, value: &mut Bytes) -> BerResult<()> {
        if self.tag().tag_type() == BerTagType::Primitive {
            *value = self.read_body()?;
            return Ok(());
        }

        let mut collected = BytesMut::new();
        while self.has_more() {
            let mut segment = Node::new(&mut *self.session);
            segment.read_tag_header()?;
            if segment.tag() != BerTag::universal(false, UniversalTagNumber::OctetString.number()) {
                return Err(segment.log_error(BerError::tag_mismatch(
                    "Expected primitive OCTET STRING segment",
                )));
            }
            collected.extend_from_slice(&segment.read_body()?);
            segment.read_tag_trailer()?;
        }
        *value = collected.freeze();
        Ok(())
    }

    fn decode_dynamic(&mut self, value: &mut dyn DynamicValue) -> BerResult<()> {
        match value.resolve() {
            ValueMut::Dynamic(_) => Err(self.log_error(BerError::conversion(
                "Dynamic type must resolve to a concrete category",
            ))),
            resolved => self.decode_by_category(resolved),
        }
    }
}

impl Drop for Node<'_, '_> {
    fn drop(&mut self) {
        if let Some(state) = self.session.nodes.pop() {
            let consumed = state.total_consumed();
            if let Some(parent) = self.session.nodes.last_mut() {
                parent.consumed_body += consumed;
            }
        }
    }
}

/// Decodes one self-describing element
///
/// Used for the top-level value and for every array element: the element's
/// identifier must be UNIVERSAL and carry the tag number of the value's
/// natural type.
pub(crate) struct UniversalElementVisitor<'s, 'a> {
    node: Node<'s, 'a>,
}

impl<'s, 'a> UniversalElementVisitor<'s, 'a> {
    pub(crate) fn new(session: &'s mut Session<'a>) -> Self {
        Self {
            node: Node::new(session),
        }
    }

    pub(crate) fn visit(mut self, value: &mut dyn BerValue) -> BerResult<()> {
        let expected = match universal::select(value, self.node.formatting_mode()) {
            Ok(expected) => expected,
            Err(e) => return Err(self.node.log_error(e)),
        };

        self.node.read_tag_header()?;
        let tag = self.node.tag();
        if tag.class() != BerTagClass::Universal {
            return Err(self.node.log_error(BerError::TagMismatch(format!(
                "Expected UNIVERSAL tag class, got {}",
                tag.class().name()
            ))));
        }
        if tag.number() != expected.number() {
            return Err(self.node.log_error(BerError::TagMismatch(format!(
                "Unexpected tag number: expected {}, got {}",
                expected,
                tag.number()
            ))));
        }

        self.node.decode(value)?;
        self.node.read_tag_trailer()
    }
}
