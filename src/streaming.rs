mod response_stream;
mod stream_reader;
mod stream_writer;
mod task;
mod value_task;

pub use response_stream::ResponseStream;
pub use stream_reader::StreamReader;
pub use stream_writer::StreamWriter;
pub use task::Task;
pub use value_task::ValueTask;
