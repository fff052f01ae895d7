pub mod jobmodel;
pub mod messagemodel;
pub mod proposalmodel;
pub mod usermodel;
