yucore::bin!(yu_cat);
