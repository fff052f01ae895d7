pub mod jobdtos;
pub mod messagedtos;
pub mod proposaldtos;
pub mod userdtos;
