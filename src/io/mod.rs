pub(crate) mod scratch_buffer;
